//! Resolved run description
//!
//! A [`JobSpec`] is built once per run by the orchestrator's resolver and
//! passed by reference to every component. It is never mutated after
//! resolution, which is what makes reruns reproducible: two components can
//! only disagree about a derived value if they recompute it, and nothing
//! here is recomputed.

use crate::time::TimeSeries;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fully resolved, immutable description of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Plate-model name, used only for operator-facing logging
    pub model_name: String,
    /// Directory receiving the final distance grids
    pub output_dir: PathBuf,
    /// Base directory for the run (continent-contouring inputs live under it)
    pub base_dir: PathBuf,
    /// Base directory for sedimentation outputs (`sedimentation_output/` goes under it)
    pub sediment_output_base: PathBuf,
    /// Rotation files of the plate model
    pub rotation_files: Vec<PathBuf>,
    /// Topology files of the plate model
    pub topology_files: Vec<PathBuf>,
    /// Features distances are measured to (passive margins)
    pub proximity_features: Vec<PathBuf>,
    /// Polygons/polylines that distance paths must go around; empty means
    /// plain great-circle distances
    pub continent_obstacles: Vec<PathBuf>,
    /// Plate-boundary feature types also treated as obstacles.
    /// Meaningless (and required to be empty) without continent obstacles.
    pub plate_boundary_obstacle_types: Vec<String>,
    /// Age-grid filename template, keyed by time
    pub age_grid: AgeGridTemplate,
    /// Reference frame for the reconstruction
    pub anchor_plate_id: i32,
    /// Grid spacing (degrees) used for internal distance calculations
    pub internal_grid_spacing: f64,
    /// Grid spacing (degrees) of the final output grids
    pub grid_spacing: f64,
    /// Times to generate one grid for
    pub times: TimeSeries,
    /// Ocean points are not reconstructed earlier than this (Ma).
    /// `None` means limited only by the age grid.
    pub max_topological_reconstruction_time: Option<i32>,
    /// Where (if anywhere) mean distances are clamped
    pub clamp: ClampMode,
    /// Resolved worker count (always >= 1)
    pub workers: usize,
    /// Advisory memory ceiling in GB, divided across workers by the engine
    pub memory_budget_gb: Option<f64>,
    /// Whether the sedimentation flavour predicts thickness grids
    pub generate_thickness_grids: bool,
    /// Whether the sedimentation flavour predicts rate grids
    pub generate_rate_grids: bool,
    /// Start external processes at reduced scheduling priority (best effort)
    pub lower_process_priority: bool,
    /// External executable names
    pub tools: ToolNames,
}

impl JobSpec {
    /// Memory share for a single worker, if a budget is configured
    pub fn memory_per_worker_gb(&self) -> Option<f64> {
        self.memory_budget_gb.map(|gb| gb / self.workers as f64)
    }
}

/// Where mean-distance clamping happens for a run
///
/// The engine flag and the standalone raster-math step are mutually
/// exclusive by construction: a single artifact is clamped at most once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClampMode {
    /// No clamping
    None,
    /// The proximity engine clamps in-line (`--clamp_mean_distance`)
    InEngine(f64),
    /// The post-processor clamps via the raster-math tool (MIN operation)
    PostProcess(f64),
}

impl ClampMode {
    /// Threshold in km, whichever path applies
    pub fn threshold_km(&self) -> Option<f64> {
        match self {
            ClampMode::None => None,
            ClampMode::InEngine(km) | ClampMode::PostProcess(km) => Some(*km),
        }
    }
}

/// Age-grid filename template
///
/// Produces one age-grid path per time by zero-padding the time to the
/// configured width between a fixed prefix and extension, e.g.
/// `agegrids/AgeGrid-0100.nc` for time 100 with padding 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGridTemplate {
    /// Directory holding the age grids
    pub dir: PathBuf,
    /// Filename part before the time token
    pub filename_prefix: String,
    /// Minimum width the time token is zero-padded to
    pub zero_padding: usize,
    /// Filename part after the time token (includes the dot)
    pub filename_ext: String,
}

impl AgeGridTemplate {
    /// Age-grid path for one time value
    pub fn path_for(&self, time: i32) -> PathBuf {
        self.dir.join(format!(
            "{}{:0>width$}{}",
            self.filename_prefix,
            time,
            self.filename_ext,
            width = self.zero_padding
        ))
    }
}

/// Names of the external executables the orchestrator invokes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolNames {
    /// Geospatial reconstruction/proximity engine
    pub proximity: String,
    /// Raster-math tool used for standalone clamping
    pub raster: String,
    /// Sedimentation-rate prediction tool
    pub predict_rate: String,
    /// Sediment-thickness prediction tool
    pub predict_thickness: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            proximity: "ocean_basin_proximity".to_string(),
            raster: "gmt".to_string(),
            predict_rate: "predict_sedimentation_rate".to_string(),
            predict_thickness: "predict_sediment_thickness".to_string(),
        }
    }
}

/// Renders a numeric token the way artifact names and command lines expect:
/// no trailing `.0` (spacing 1.0 becomes "1", 0.1 stays "0.1")
pub fn number_token(value: f64) -> String {
    value.to_string()
}

/// Joins a list of filenames onto a model directory
pub fn join_model_files(model_dir: &Path, names: &[String]) -> Vec<PathBuf> {
    names.iter().map(|name| model_dir.join(name)).collect()
}
