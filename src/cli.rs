use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::SessionConfig;

#[derive(Parser)]
#[clap(author, version, about = "Cross-platform SFTP client", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
    #[clap(short, long, global = true, help = "Print verbose diagnostic logs for debugging")]
    pub verbose: bool,
}

/// Connection flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    #[clap(long, help = "SFTP server hostname")]
    pub host: String,
    #[clap(short, long, help = "Username")]
    pub username: String,
    #[clap(short, long, default_value_t = 22, help = "Port number")]
    pub port: u16,
    #[clap(short = 'w', long, help = "Password")]
    pub password: Option<String>,
    #[clap(short, long = "key", help = "Path to private key file")]
    pub key: Option<PathBuf>,
}

impl ConnectArgs {
    pub fn to_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            private_key_path: self.key.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(about = "Upload a file to the SFTP server")]
    Upload {
        #[clap(flatten)]
        conn: ConnectArgs,
        #[clap(short, long, help = "Local file path")]
        local: PathBuf,
        #[clap(short, long, help = "Remote destination path")]
        remote: String,
    },
    #[clap(about = "Download a file from the SFTP server")]
    Download {
        #[clap(flatten)]
        conn: ConnectArgs,
        #[clap(short, long, help = "Remote file path")]
        remote: String,
        #[clap(short, long, help = "Local destination path")]
        local: PathBuf,
    },
    #[clap(about = "List files in a remote directory")]
    List {
        #[clap(flatten)]
        conn: ConnectArgs,
        #[clap(short, long, help = "Remote directory path")]
        remote: String,
    },
    #[clap(about = "Delete a file on the remote server")]
    Delete {
        #[clap(flatten)]
        conn: ConnectArgs,
        #[clap(short, long, help = "Remote file path")]
        remote: String,
    },
    #[clap(about = "Create a directory on the remote server")]
    Mkdir {
        #[clap(flatten)]
        conn: ConnectArgs,
        #[clap(short, long, help = "Remote directory path")]
        remote: String,
    },
}
