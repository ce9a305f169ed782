//! Predicted sedimentation grid generation command

use anyhow::Result;
use paleogrid_core::domain::{BatchSummary, JobSpec};
use paleogrid_orchestrator::run_sedimentation_batch;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(spec: &JobSpec, cancel: CancellationToken) -> Result<BatchSummary> {
    info!(
        model = %spec.model_name,
        times = spec.times.len(),
        rate = spec.generate_rate_grids,
        thickness = spec.generate_thickness_grids,
        "generating predicted sedimentation grids"
    );
    run_sedimentation_batch(spec, cancel).await
}
