use clap::Parser;
use owo_colors::OwoColorize;

use skiff::cli::{Cli, Commands};
use skiff::{commands, util};

fn main() {
    let cli = Cli::parse();
    // Guard must live until exit so buffered log lines flush.
    let _log_guard = if cli.verbose { util::init_verbose_logging() } else { None };

    let result = match &cli.command {
        Commands::Upload { conn, local, remote } => commands::handle_upload(conn, local, remote),
        Commands::Download { conn, remote, local } => {
            commands::handle_download(conn, remote, local)
        }
        Commands::List { conn, remote } => commands::handle_list(conn, remote),
        Commands::Delete { conn, remote } => commands::handle_delete(conn, remote),
        Commands::Mkdir { conn, remote } => commands::handle_mkdir(conn, remote),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "✗ Error:".red(), e);
        std::process::exit(1);
    }
}
