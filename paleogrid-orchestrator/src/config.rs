//! Workflow configuration model
//!
//! Mirrors the YAML document driving a run: a mapping of mappings with the
//! groups InputFiles, OutputFiles, GridParameters, TimeParameters,
//! Parameters and SedimentThicknessWorkflowParameters. Every key is
//! optional at this layer so the resolver can report exactly which required
//! key is missing (serde would otherwise reject the whole group).
//!
//! Boolean-like options are deliberately kept as strings here; the resolver
//! owns the parsing contract for them.

use paleogrid_core::error::SpecError;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowConfig {
    #[serde(rename = "InputFiles", default)]
    pub input_files: InputFiles,
    #[serde(rename = "OutputFiles", default)]
    pub output_files: OutputFiles,
    #[serde(rename = "GridParameters", default)]
    pub grid_parameters: GridParameters,
    #[serde(rename = "TimeParameters", default)]
    pub time_parameters: TimeParameters,
    #[serde(rename = "Parameters", default)]
    pub parameters: Parameters,
    #[serde(rename = "SedimentThicknessWorkflowParameters", default)]
    pub workflow: SedimentThicknessWorkflowParameters,
    #[serde(rename = "Tools", default)]
    pub tools: Tools,
}

impl WorkflowConfig {
    /// Loads a configuration document from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, SpecError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SpecError::Load(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&raw)
    }

    /// Parses a configuration document from YAML text
    pub fn from_yaml(raw: &str) -> Result<Self, SpecError> {
        serde_yaml::from_str(raw).map_err(|e| SpecError::Load(e.to_string()))
    }
}

/// `InputFiles` group: the plate model and feature files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputFiles {
    pub model_name: Option<String>,
    pub model_dir: Option<String>,
    pub rotation_files: Option<Vec<String>>,
    pub topology_files: Option<Vec<String>>,
    pub coastline_file: Option<String>,
    pub sediment_thickness_features: Option<String>,
    pub plate_boundary_obstacles_list: Option<Vec<String>>,
    pub agegrid_dir: Option<String>,
    pub agegrid_filename: Option<String>,
    pub agegrid_filename_ext: Option<String>,
    pub agegrid_age_zero_padding: Option<usize>,
    pub anchor_plate_id: Option<i32>,
}

/// `OutputFiles` group: where artifacts land and how paths are stamped
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputFiles {
    pub paleobathymetry_main_output_dir: Option<String>,
    /// Boolean-like string; whether resolved paths carry a date segment
    pub include_date_in_output_dir: Option<String>,
    /// Either a literal `YYYYMMDD` stamp or the sentinel `today`
    pub date: Option<String>,
    pub sediment_thickness_output_dir: Option<String>,
    /// Boolean-like string; whether output nests under the main output dir
    pub sediment_thickness_within_main_output_dir: Option<String>,
}

/// `GridParameters` group
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridParameters {
    pub grid_spacing: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
}

/// `TimeParameters` group (Ma, whole numbers)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeParameters {
    pub time_min: Option<i32>,
    pub time_max: Option<i32>,
    pub time_step: Option<i32>,
}

/// `Parameters` group: host-level running parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    pub number_of_cpus: Option<CpuCount>,
    /// Boolean-like string, default true; best-effort niceness for workers
    pub lower_process_priority: Option<String>,
}

/// Worker-count knob: `true` means all available processors, an integer
/// means exactly that many. Anything else is rejected at resolution.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum CpuCount {
    All(bool),
    Exact(i64),
}

/// `SedimentThicknessWorkflowParameters` group
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SedimentThicknessWorkflowParameters {
    pub sed_distance_internal_grid_spacing: Option<f64>,
    pub max_memory_usage_in_gb_sedthickness: Option<f64>,
    /// Boolean-like string; take proximity/obstacle inputs from the
    /// continent-contouring workflow's outputs
    pub use_continent_contouring_workflow: Option<String>,
    pub max_topological_reconstruction_time: Option<i32>,
    pub clamp_mean_proximity_kms: Option<f64>,
    /// Boolean-like string, default true; clamp in the engine rather than
    /// in the post-processing raster-math step
    pub clamp_in_engine: Option<String>,
    pub generate_sediment_thickness_grids: Option<String>,
    pub generate_sedimentation_rate_grids: Option<String>,
}

/// `Tools` group: external executable names, all defaulted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tools {
    pub proximity: Option<String>,
    pub raster: Option<String>,
    pub predict_rate: Option<String>,
    pub predict_thickness: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let config = WorkflowConfig::from_yaml(
            r#"
InputFiles:
  model_name: Muller2019
  model_dir: /models/muller
TimeParameters:
  time_min: 0
  time_max: 10
  time_step: 1
"#,
        )
        .unwrap();
        assert_eq!(config.input_files.model_name.as_deref(), Some("Muller2019"));
        assert_eq!(config.time_parameters.time_max, Some(10));
        // Absent groups default to all-None.
        assert!(config.output_files.date.is_none());
    }

    #[test]
    fn test_cpu_count_accepts_bool_and_int() {
        let config = WorkflowConfig::from_yaml("Parameters:\n  number_of_cpus: true\n").unwrap();
        assert!(matches!(
            config.parameters.number_of_cpus,
            Some(CpuCount::All(true))
        ));

        let config = WorkflowConfig::from_yaml("Parameters:\n  number_of_cpus: 4\n").unwrap();
        assert!(matches!(
            config.parameters.number_of_cpus,
            Some(CpuCount::Exact(4))
        ));
    }

    #[test]
    fn test_null_memory_means_unconstrained() {
        let config = WorkflowConfig::from_yaml(
            "SedimentThicknessWorkflowParameters:\n  max_memory_usage_in_gb_sedthickness: null\n",
        )
        .unwrap();
        assert!(config.workflow.max_memory_usage_in_gb_sedthickness.is_none());
    }

    #[test]
    fn test_malformed_document_is_a_load_error() {
        let err = WorkflowConfig::from_yaml("InputFiles: [not, a, mapping]").unwrap_err();
        assert!(matches!(err, SpecError::Load(_)));
    }
}
