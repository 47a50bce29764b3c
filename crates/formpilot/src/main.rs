//! formpilot - Google Forms agent for your terminal

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

use commands::{ask_command, init_command, status_command};

/// formpilot - build Google Forms from a single request
#[derive(Parser)]
#[command(name = "formpilot")]
#[command(about = "Build Google Forms from a single free-text request")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config
    Init,
    /// Run one form-building request
    Ask {
        /// Request text; prompted on stdin when omitted
        #[arg(short, long)]
        message: Option<String>,
        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Ask { verbose: true, .. }) {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Ask { message, verbose: _ } => {
            if let Err(e) = ask_command(message).await {
                error!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
