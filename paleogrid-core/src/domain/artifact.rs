//! Artifact naming
//!
//! The proximity engine is handed an output prefix and appends its own
//! `_mean_distance` suffix, so the raw file carries the time in the middle
//! of the basename. Downstream raster-import tooling requires a fixed
//! prefix with the time as the trailing token, hence the canonical rename.
//!
//! Lifecycle of one artifact: Raw -> (Clamped) -> Renamed -> Cleaned.

use super::spec::number_token;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filesystem plan for one job's artifact
///
/// All paths are deterministic from (output directory, grid spacing, time),
/// so concurrent post-processing of different jobs never collides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPlan {
    /// Prefix handed to the engine as its final positional argument
    pub engine_prefix: PathBuf,
    /// Grid file the engine emits
    pub raw: PathBuf,
    /// Text coordinate-listing sibling the engine may emit
    pub auxiliary: PathBuf,
    /// Intermediate written by the standalone clamp step, replacing `raw`
    pub clamped: PathBuf,
    /// Canonical destination (`mean_distance_<spacing>d_<time>.nc`)
    pub destination: PathBuf,
}

impl ArtifactPlan {
    /// Plan for a mean-distance grid at one time value
    pub fn distance(output_dir: &Path, grid_spacing: f64, time: i32) -> Self {
        let spacing = number_token(grid_spacing);
        let prefix = format!("distance_{spacing}d_{time}");
        Self {
            engine_prefix: output_dir.join(&prefix),
            raw: output_dir.join(format!("{prefix}_mean_distance.nc")),
            auxiliary: output_dir.join(format!("{prefix}_mean_distance.xy")),
            clamped: output_dir.join(format!("{prefix}_mean_distance_clamped.nc")),
            destination: output_dir.join(format!("mean_distance_{spacing}d_{time}.nc")),
        }
    }

    /// Canonical basename without extension, e.g. `mean_distance_1d_50`
    pub fn canonical_stem(grid_spacing: f64, time: i32) -> String {
        format!("mean_distance_{}d_{}", number_token(grid_spacing), time)
    }
}
