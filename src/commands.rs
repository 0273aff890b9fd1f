use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::cli::ConnectArgs;
use crate::session::SessionClient;
use crate::{paths, util};

// Every handler follows the same shape as the front ends it serves: fresh
// client, connect, one operation, unconditional disconnect. Errors bubble
// to main, which prints the failure marker and exits non-zero.

fn connect_client(conn: &ConnectArgs) -> Result<SessionClient> {
    let config = conn.to_config();
    println!("{}", "Connecting to SFTP server...".blue());
    let mut client = SessionClient::new();
    match client.connect(&config) {
        Ok(()) => {
            println!("{}", "✓ Connected successfully".green());
            Ok(client)
        }
        Err(e) => {
            client.disconnect();
            Err(e.into())
        }
    }
}

pub fn handle_upload(conn: &ConnectArgs, local: &Path, remote: &str) -> Result<()> {
    let mut client = connect_client(conn)?;
    let destination = paths::resolve_upload_destination(local, remote);
    println!(
        "{}",
        format!("Uploading {} to {}...", local.display(), destination).blue()
    );
    let pb = util::transfer_progress_bar();
    let mut observer = util::progress_observer(&pb);
    let result = client.upload(local, &destination, Some(&mut observer));
    pb.finish_and_clear();
    client.disconnect();
    result?;
    println!("{}", "✓ Upload completed successfully".green());
    Ok(())
}

pub fn handle_download(conn: &ConnectArgs, remote: &str, local: &Path) -> Result<()> {
    let mut client = connect_client(conn)?;
    println!(
        "{}",
        format!("Downloading {} to {}...", remote, local.display()).blue()
    );
    let pb = util::transfer_progress_bar();
    let mut observer = util::progress_observer(&pb);
    let result = client.download(remote, local, Some(&mut observer));
    pb.finish_and_clear();
    client.disconnect();
    result?;
    println!("{}", "✓ Download completed successfully".green());
    Ok(())
}

pub fn handle_list(conn: &ConnectArgs, remote: &str) -> Result<()> {
    let mut client = connect_client(conn)?;
    println!("{}", format!("Listing files in {}...", remote).blue());
    let result = client.list(remote);
    client.disconnect();
    let entries = result?;
    println!("\nFiles and directories:");
    for entry in &entries {
        let tag = if entry.is_directory {
            "[DIR] ".cyan().to_string()
        } else {
            "[FILE]".yellow().to_string()
        };
        println!(
            "{} {:<30} {}",
            tag,
            entry.filename,
            format!("{:>10} bytes", entry.size).dimmed()
        );
    }
    Ok(())
}

pub fn handle_delete(conn: &ConnectArgs, remote: &str) -> Result<()> {
    let mut client = connect_client(conn)?;
    println!("{}", format!("Deleting {}...", remote).blue());
    let result = client.remove_file(remote);
    client.disconnect();
    result?;
    println!("{}", "✓ File deleted successfully".green());
    Ok(())
}

pub fn handle_mkdir(conn: &ConnectArgs, remote: &str) -> Result<()> {
    let mut client = connect_client(conn)?;
    println!("{}", format!("Creating directory {}...", remote).blue());
    let result = client.mkdir(remote);
    client.disconnect();
    result?;
    println!("{}", "✓ Directory created successfully".green());
    Ok(())
}
