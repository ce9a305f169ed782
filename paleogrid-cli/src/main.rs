//! Paleogrid CLI
//!
//! Command-line interface for the paleogrid batch orchestrator.

mod commands;

use clap::Parser;
use commands::{Commands, handle_command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "paleogrid")]
#[command(about = "Geological time-series grid batch orchestrator", long_about = None)]
struct Cli {
    /// Workflow configuration file
    #[arg(long, short = 'c', env = "PALEOGRID_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paleogrid=info,paleogrid_orchestrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match handle_command(cli.command, &cli.config).await {
        Ok(exit) => exit,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
