//! Artifact post-processing
//!
//! Turns a completed job's raw engine output into the canonical, cleaned
//! artifact. Three steps, strictly in order within one job, each
//! independently idempotent:
//!
//! 1. standalone clamp (raster-math MIN against the threshold), replacing
//!    the raw file, only when the run clamps in post-processing;
//! 2. removal of the auxiliary text-coordinate sibling, best effort;
//! 3. overwrite-rename to the canonical time-trailing basename.
//!
//! Running the whole sequence twice on the same job is a no-op the second
//! time: reruns land on an already-renamed artifact and return it.

use crate::command::clamp_command;
use crate::process;
use paleogrid_core::domain::{ArtifactPlan, ClampMode, JobSpec};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from post-processing one artifact
#[derive(Debug, Error)]
pub enum PostProcessError {
    /// The engine reported success but its output grid is not on disk
    #[error("expected raw artifact `{}` is missing", .0.display())]
    MissingRaw(PathBuf),

    /// The raster-math clamp invocation failed
    #[error("clamp step failed for `{}`: {reason}", .path.display())]
    Clamp {
        /// Input grid being clamped
        path: PathBuf,
        /// Underlying tool error
        reason: String,
    },

    /// A filesystem step failed
    #[error("post-processing io error on `{}`: {source}", .path.display())]
    Io {
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl PostProcessError {
    fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Post-processor for one run's artifacts
///
/// Carries only what the steps need: the raster tool name and the
/// threshold when this run clamps in post-processing.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    raster_tool: String,
    clamp_threshold_km: Option<f64>,
}

impl PostProcessor {
    /// Builds the post-processor for a resolved run.
    ///
    /// The standalone clamp step only exists for `ClampMode::PostProcess`;
    /// in-engine clamping already happened inside the job's subprocess.
    pub fn from_spec(spec: &JobSpec) -> Self {
        let clamp_threshold_km = match spec.clamp {
            ClampMode::PostProcess(km) => Some(km),
            ClampMode::None | ClampMode::InEngine(_) => None,
        };
        Self {
            raster_tool: spec.tools.raster.clone(),
            clamp_threshold_km,
        }
    }

    /// Runs all steps for one artifact, returning the canonical path
    pub async fn run(&self, plan: &ArtifactPlan) -> Result<PathBuf, PostProcessError> {
        // Pick up wherever a previous (possibly interrupted) run left off.
        let mut source = if file_exists(&plan.raw).await {
            plan.raw.clone()
        } else if file_exists(&plan.clamped).await {
            plan.clamped.clone()
        } else if file_exists(&plan.destination).await {
            // Fully processed already; nothing to redo.
            debug!(artifact = %plan.destination.display(), "artifact already post-processed");
            remove_auxiliary(plan).await;
            return Ok(plan.destination.clone());
        } else {
            return Err(PostProcessError::MissingRaw(plan.raw.clone()));
        };

        // Step 1: standalone clamp, replacing the raw file.
        if let Some(km) = self.clamp_threshold_km
            && source == plan.raw
        {
            let command = clamp_command(&self.raster_tool, &plan.raw, km, &plan.clamped);
            process::run(&command, false)
                .await
                .map_err(|e| PostProcessError::Clamp {
                    path: plan.raw.clone(),
                    reason: format!("{e:#}"),
                })?;
            tokio::fs::remove_file(&plan.raw)
                .await
                .map_err(|e| PostProcessError::io(&plan.raw, e))?;
            source = plan.clamped.clone();
        }

        // Step 2: auxiliary coordinate listing, best effort.
        remove_auxiliary(plan).await;

        // Step 3: overwrite-rename to the canonical basename. Reruns must
        // replace stale output, never fail on it or leave duplicates.
        if file_exists(&plan.destination).await {
            tokio::fs::remove_file(&plan.destination)
                .await
                .map_err(|e| PostProcessError::io(&plan.destination, e))?;
        }
        tokio::fs::rename(&source, &plan.destination)
            .await
            .map_err(|e| PostProcessError::io(&source, e))?;

        debug!(artifact = %plan.destination.display(), "artifact post-processed");
        Ok(plan.destination.clone())
    }
}

/// Removes the `.xy` sibling if present; absence is not an error
async fn remove_auxiliary(plan: &ArtifactPlan) {
    match tokio::fs::remove_file(&plan.auxiliary).await {
        Ok(()) => debug!(file = %plan.auxiliary.display(), "removed auxiliary coordinate file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            file = %plan.auxiliary.display(),
            error = %e,
            "could not remove auxiliary coordinate file"
        ),
    }
}

async fn file_exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
