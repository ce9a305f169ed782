//! JobSpec resolver
//!
//! Merges the loaded configuration with fallback defaults and produces the
//! single immutable [`JobSpec`] every other component works from. All
//! boolean-like string flags are normalised here and nowhere else; the run
//! date is computed exactly once so every derived path in a run agrees on it.

use crate::config::{CpuCount, WorkflowConfig};
use paleogrid_core::domain::spec::join_model_files;
use paleogrid_core::domain::{AgeGridTemplate, ClampMode, JobSpec, ToolNames};
use paleogrid_core::error::SpecError;
use paleogrid_core::time::TimeSeries;
use std::path::PathBuf;

/// Sentinel in `OutputFiles.date` meaning "stamp with the resolver's run date"
const DATE_TODAY: &str = "today";

/// Fixed subdirectory of the workflow inside any resolved base
const WORKFLOW_SUBDIR: &str = "sediment_thickness_D17";

/// Subdirectory the main output dir nests workflow output under
const TRADITIONAL_SUBDIR: &str = "traditional_paleobathymetry";

/// Parses a boolean-like configuration string.
///
/// The documented contract, applied independently wherever a flag-like
/// option is read: case-insensitive membership in {"true", "1", "t", "y",
/// "yes"} means true, anything else means false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "t" | "y" | "yes"
    )
}

/// Reads an optional boolean-like flag with a default
fn flag_or(value: Option<&String>, default: bool) -> bool {
    value.map(|s| parse_flag(s)).unwrap_or(default)
}

/// Resolves configuration into a [`JobSpec`], stamping dated paths with
/// today's date
pub fn resolve(config: &WorkflowConfig) -> Result<JobSpec, SpecError> {
    let today = chrono::Local::now().format("%Y%m%d").to_string();
    resolve_with_date(config, &today)
}

/// Resolves configuration into a [`JobSpec`] with an explicit run date
/// (`YYYYMMDD`), shared by every directory computation in the run
pub fn resolve_with_date(config: &WorkflowConfig, today: &str) -> Result<JobSpec, SpecError> {
    let input = &config.input_files;

    let model_name = require(&input.model_name, "InputFiles.model_name")?;
    let model_dir = PathBuf::from(require(&input.model_dir, "InputFiles.model_dir")?);

    let rotation_files = join_model_files(
        &model_dir,
        &require(&input.rotation_files, "InputFiles.rotation_files")?,
    );
    let topology_files = join_model_files(
        &model_dir,
        &require(&input.topology_files, "InputFiles.topology_files")?,
    );

    let grid_spacing = require(
        &config.grid_parameters.grid_spacing,
        "GridParameters.grid_spacing",
    )?;
    if grid_spacing <= 0.0 {
        return Err(SpecError::invalid(
            "GridParameters.grid_spacing",
            "must be > 0",
        ));
    }
    let internal_grid_spacing = config
        .workflow
        .sed_distance_internal_grid_spacing
        .unwrap_or(grid_spacing);
    if internal_grid_spacing <= 0.0 {
        return Err(SpecError::invalid(
            "SedimentThicknessWorkflowParameters.sed_distance_internal_grid_spacing",
            "must be > 0",
        ));
    }

    let times = TimeSeries::new(
        require(&config.time_parameters.time_min, "TimeParameters.time_min")?,
        require(&config.time_parameters.time_max, "TimeParameters.time_max")?,
        require(&config.time_parameters.time_step, "TimeParameters.time_step")?,
    )?;

    let dirs = resolve_directories(config, today, grid_spacing)?;

    // Proximity and obstacle inputs: either the continent-contouring
    // workflow's fixed outputs under the base dir, or the configured files.
    let contouring = flag_or(config.workflow.use_continent_contouring_workflow.as_ref(), false);
    let (proximity_features, continent_obstacles) = if contouring {
        let contour_dir = dirs.base.join("continent_contouring");
        (
            vec![contour_dir.join("passive_margin_features.gpmlz")],
            vec![contour_dir.join("continent_contour_features.gpmlz")],
        )
    } else {
        let features = PathBuf::from(require(
            &input.sediment_thickness_features,
            "InputFiles.sediment_thickness_features",
        )?);
        let obstacles = input
            .coastline_file
            .as_ref()
            .map(|f| vec![model_dir.join(f)])
            .unwrap_or_default();
        (vec![features], obstacles)
    };

    let plate_boundary_obstacle_types = input.plate_boundary_obstacles_list.clone().unwrap_or_default();
    if continent_obstacles.is_empty() && !plate_boundary_obstacle_types.is_empty() {
        return Err(SpecError::invalid(
            "InputFiles.plate_boundary_obstacles_list",
            "plate-boundary obstacle types require continent obstacle files",
        ));
    }

    let age_grid = AgeGridTemplate {
        dir: PathBuf::from(require(&input.agegrid_dir, "InputFiles.agegrid_dir")?),
        filename_prefix: require(&input.agegrid_filename, "InputFiles.agegrid_filename")?,
        zero_padding: require(
            &input.agegrid_age_zero_padding,
            "InputFiles.agegrid_age_zero_padding",
        )?,
        filename_ext: require(
            &input.agegrid_filename_ext,
            "InputFiles.agegrid_filename_ext",
        )?,
    };

    let clamp = resolve_clamp(config)?;
    let workers = resolve_worker_count(config.parameters.number_of_cpus)?;

    let memory_budget_gb = config.workflow.max_memory_usage_in_gb_sedthickness;
    if let Some(gb) = memory_budget_gb
        && gb <= 0.0
    {
        return Err(SpecError::invalid(
            "SedimentThicknessWorkflowParameters.max_memory_usage_in_gb_sedthickness",
            "must be > 0 when set",
        ));
    }

    let tools = ToolNames {
        proximity: config
            .tools
            .proximity
            .clone()
            .unwrap_or_else(|| ToolNames::default().proximity),
        raster: config
            .tools
            .raster
            .clone()
            .unwrap_or_else(|| ToolNames::default().raster),
        predict_rate: config
            .tools
            .predict_rate
            .clone()
            .unwrap_or_else(|| ToolNames::default().predict_rate),
        predict_thickness: config
            .tools
            .predict_thickness
            .clone()
            .unwrap_or_else(|| ToolNames::default().predict_thickness),
    };

    Ok(JobSpec {
        model_name,
        output_dir: dirs.distance_output,
        base_dir: dirs.base,
        sediment_output_base: dirs.sediment_output_base,
        rotation_files,
        topology_files,
        proximity_features,
        continent_obstacles,
        plate_boundary_obstacle_types,
        age_grid,
        anchor_plate_id: require(&input.anchor_plate_id, "InputFiles.anchor_plate_id")?,
        internal_grid_spacing,
        grid_spacing,
        times,
        max_topological_reconstruction_time: config.workflow.max_topological_reconstruction_time,
        clamp,
        workers,
        memory_budget_gb,
        generate_thickness_grids: flag_or(
            config.workflow.generate_sediment_thickness_grids.as_ref(),
            false,
        ),
        generate_rate_grids: flag_or(
            config.workflow.generate_sedimentation_rate_grids.as_ref(),
            false,
        ),
        lower_process_priority: flag_or(config.parameters.lower_process_priority.as_ref(), true),
        tools,
    })
}

/// Resolved directory triple shared by both batch flavours
struct ResolvedDirs {
    /// Run base (continent-contouring inputs live under it)
    base: PathBuf,
    /// Base for sedimentation outputs (`distances_*` and
    /// `sedimentation_output/` go under it)
    sediment_output_base: PathBuf,
    /// Final distance-grid directory
    distance_output: PathBuf,
}

/// Output directory construction: a 2x2 decision table over the two
/// independent booleans (nest under main output dir, include date in path).
/// All four combinations produce distinct, well-formed paths.
fn resolve_directories(
    config: &WorkflowConfig,
    today: &str,
    grid_spacing: f64,
) -> Result<ResolvedDirs, SpecError> {
    let output = &config.output_files;
    let main_dir = PathBuf::from(require(
        &output.paleobathymetry_main_output_dir,
        "OutputFiles.paleobathymetry_main_output_dir",
    )?);
    let sediment_dir = PathBuf::from(require(
        &output.sediment_thickness_output_dir,
        "OutputFiles.sediment_thickness_output_dir",
    )?);

    let nested = flag_or(
        output.sediment_thickness_within_main_output_dir.as_ref(),
        false,
    );
    let dated = flag_or(output.include_date_in_output_dir.as_ref(), false);

    // The sentinel "today" picks up the run date computed once per resolve.
    let date = match output.date.as_deref() {
        Some(DATE_TODAY) | None => today.to_string(),
        Some(literal) => literal.to_string(),
    };

    let (base, sediment_output_base) = match (nested, dated) {
        (true, true) => {
            let base = main_dir.join(&date);
            let out = base.join(TRADITIONAL_SUBDIR).join(&sediment_dir).join(WORKFLOW_SUBDIR);
            (base, out)
        }
        (true, false) => {
            let out = main_dir
                .join(TRADITIONAL_SUBDIR)
                .join(&sediment_dir)
                .join(WORKFLOW_SUBDIR);
            (main_dir, out)
        }
        (false, true) => {
            let base = main_dir.join(&date);
            let out = sediment_dir.join(&date).join(WORKFLOW_SUBDIR);
            (base, out)
        }
        (false, false) => (main_dir, sediment_dir.join(WORKFLOW_SUBDIR)),
    };

    let distance_output = sediment_output_base.join(format!(
        "distances_{}d",
        paleogrid_core::domain::spec::number_token(grid_spacing)
    ));

    Ok(ResolvedDirs {
        base,
        sediment_output_base,
        distance_output,
    })
}

/// Resolves the worker-count knob.
///
/// `true` means all available logical processors, a positive integer means
/// exactly that many; `false`, zero and negatives are errors. A missing
/// knob falls back to a single worker.
fn resolve_worker_count(count: Option<CpuCount>) -> Result<usize, SpecError> {
    match count {
        None => Ok(1),
        Some(CpuCount::All(true)) => Ok(std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)),
        Some(CpuCount::All(false)) => Err(SpecError::InvalidWorkerCount(
            "false is neither `true` (all processors) nor a positive integer".to_string(),
        )),
        Some(CpuCount::Exact(n)) if n > 0 => Ok(n as usize),
        Some(CpuCount::Exact(n)) => Err(SpecError::InvalidWorkerCount(format!(
            "{n} is not a positive integer"
        ))),
    }
}

/// Resolves where (if anywhere) clamping happens.
///
/// A configured threshold picks exactly one path: the engine flag when
/// `clamp_in_engine` is true (the default), the post-processing raster-math
/// step otherwise. One artifact is never clamped twice.
fn resolve_clamp(config: &WorkflowConfig) -> Result<ClampMode, SpecError> {
    let Some(km) = config.workflow.clamp_mean_proximity_kms else {
        return Ok(ClampMode::None);
    };
    if km <= 0.0 {
        return Err(SpecError::invalid(
            "SedimentThicknessWorkflowParameters.clamp_mean_proximity_kms",
            "must be > 0 when set",
        ));
    }
    if flag_or(config.workflow.clamp_in_engine.as_ref(), true) {
        Ok(ClampMode::InEngine(km))
    } else {
        Ok(ClampMode::PostProcess(km))
    }
}

fn require<T: Clone>(value: &Option<T>, key: &str) -> Result<T, SpecError> {
    value.clone().ok_or_else(|| SpecError::missing(key))
}
