//! Paleogrid Orchestrator
//!
//! Batch engine for geological time-series grid generation.
//!
//! Architecture:
//! - Configuration: YAML workflow document with grouped, optional keys
//! - Resolver: validates the document into an immutable JobSpec
//! - Command builders: pure argv construction for the external tools
//! - Dispatcher: bounded worker pool with cooperative cancellation
//! - Post-processor: clamps, cleans and renames per-time artifacts
//!
//! Two batch flavours share the machinery: distance grids (proximity engine
//! plus artifact post-processing) and predicted sedimentation grids
//! (regression tool, artifacts already canonical).

pub mod command;
pub mod config;
pub mod dispatch;
pub mod postprocess;
mod process;
pub mod profiles;
pub mod resolver;

use anyhow::{Context, Result};
use paleogrid_core::domain::{ArtifactPlan, BatchSummary, Job, JobSpec};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::postprocess::PostProcessor;
use crate::profiles::{self as regression, RegressionProfile};

/// Generates one mean-distance grid per time value in the spec.
///
/// Each job runs the proximity engine and then post-processes its artifact
/// into the canonical time-trailing name. Cancellation lets running engine
/// invocations finish and abandons everything still queued.
pub async fn run_distance_batch(
    spec: &JobSpec,
    cancel: CancellationToken,
) -> Result<BatchSummary> {
    ensure_dir(&spec.output_dir)?;

    let jobs: Vec<Job> = spec
        .times
        .iter()
        .map(|time| {
            let plan = ArtifactPlan::distance(&spec.output_dir, spec.grid_spacing, time);
            let command = command::proximity_command(spec, time, &plan);
            Job {
                time,
                command,
                artifact: Some(plan),
            }
        })
        .collect();

    info!(
        model = %spec.model_name,
        output_dir = %spec.output_dir.display(),
        "distance batch resolved"
    );
    let post = PostProcessor::from_spec(spec);
    let summary = Dispatcher::new(spec.workers, spec.lower_process_priority)
        .run(jobs, post, cancel)
        .await;
    Ok(summary)
}

/// Generates predicted sedimentation grids per time value, one job per
/// enabled regression profile.
///
/// Prediction jobs consume the canonical distance grids produced by
/// [`run_distance_batch`] and write time-trailing basenames directly, so
/// they carry no post-processing plan.
pub async fn run_sedimentation_batch(
    spec: &JobSpec,
    cancel: CancellationToken,
) -> Result<BatchSummary> {
    let mut profiles: Vec<&'static RegressionProfile> = Vec::new();
    if spec.generate_rate_grids {
        profiles.push(&regression::RATE);
    }
    if spec.generate_thickness_grids {
        profiles.push(&regression::THICKNESS);
    }
    if profiles.is_empty() {
        anyhow::bail!(
            "no sedimentation outputs enabled; set generate_sedimentation_rate_grids \
             or generate_sediment_thickness_grids"
        );
    }

    for profile in &profiles {
        ensure_dir(
            &spec
                .sediment_output_base
                .join("sedimentation_output")
                .join(profile.output_subdir),
        )?;
    }

    let mut jobs = Vec::with_capacity(spec.times.len() * profiles.len());
    for time in &spec.times {
        for &profile in &profiles {
            jobs.push(Job {
                time,
                command: command::prediction_command(spec, profile, time),
                artifact: None,
            });
        }
    }

    info!(
        model = %spec.model_name,
        profiles = profiles.len(),
        "sedimentation batch resolved"
    );
    let post = PostProcessor::from_spec(spec);
    let summary = Dispatcher::new(spec.workers, spec.lower_process_priority)
        .run(jobs, post, cancel)
        .await;
    Ok(summary)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        info!(dir = %dir.display(), "creating output directory");
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}
