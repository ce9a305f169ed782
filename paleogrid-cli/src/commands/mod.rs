//! Commands module
//!
//! Defines the CLI subcommands and routes them to their handlers.

mod distance;
mod sedimentation;

use anyhow::{Context, Result};
use clap::Subcommand;
use paleogrid_core::domain::{BatchSummary, JobSpec};
use paleogrid_orchestrator::config::WorkflowConfig;
use paleogrid_orchestrator::resolver;
use std::path::Path;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate mean-distance grids across the configured time series
    Distance,
    /// Generate predicted sedimentation grids from existing distance grids
    Sedimentation,
}

/// Handle a CLI command
///
/// Loads and resolves the workflow configuration, wires Ctrl-C to
/// cooperative cancellation, and maps the batch summary to an exit code.
pub async fn handle_command(command: Commands, config_path: &Path) -> Result<ExitCode> {
    let config = WorkflowConfig::from_file(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let spec = resolver::resolve(&config).context("invalid workflow configuration")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone());

    let summary = match command {
        Commands::Distance => distance::run(&spec, cancel).await?,
        Commands::Sedimentation => sedimentation::run(&spec, cancel).await?,
    };
    Ok(report(&spec, &summary))
}

/// First Ctrl-C requests a graceful stop: queued jobs are abandoned while
/// running external processes finish and are recorded.
fn spawn_interrupt_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing running jobs and stopping");
            cancel.cancel();
        }
    });
}

fn report(spec: &JobSpec, summary: &BatchSummary) -> ExitCode {
    info!(model = %spec.model_name, "{}", summary.describe());
    for failure in summary.failures() {
        error!(
            time = failure.time,
            "job failed: {}",
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    if summary.exit_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
