//! Distance grid generation command

use anyhow::Result;
use paleogrid_core::domain::{BatchSummary, JobSpec};
use paleogrid_orchestrator::run_distance_batch;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(spec: &JobSpec, cancel: CancellationToken) -> Result<BatchSummary> {
    info!(
        model = %spec.model_name,
        times = spec.times.len(),
        workers = spec.workers,
        "generating mean-distance grids"
    );
    run_distance_batch(spec, cancel).await
}
