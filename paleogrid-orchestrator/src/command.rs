//! External command construction
//!
//! Pure functions from (JobSpec, time) to ordered argument lists. Nothing
//! here touches the filesystem or spawns anything: identical inputs always
//! yield identical argument lists, which is what makes job construction
//! testable without the external tools installed.

use crate::profiles::RegressionProfile;
use paleogrid_core::domain::spec::number_token;
use paleogrid_core::domain::{ArtifactPlan, ClampMode, JobSpec};
use std::path::Path;

fn push_path(args: &mut Vec<String>, path: &Path) {
    args.push(path.display().to_string());
}

/// Builds the proximity-engine invocation for one time value.
///
/// The engine computes, for every ocean point, the mean distance to the
/// proximity features over the point's lifetime, and writes a grid under
/// the plan's output prefix.
pub fn proximity_command(spec: &JobSpec, time: i32, plan: &ArtifactPlan) -> Vec<String> {
    let mut args = vec![spec.tools.proximity.clone()];

    // Rotation files.
    args.push("-r".to_string());
    for rotation in &spec.rotation_files {
        push_path(&mut args, rotation);
    }

    // Proximity files, marked non-topological.
    args.push("-m".to_string());
    for features in &spec.proximity_features {
        push_path(&mut args, features);
    }
    args.push("-n".to_string());

    // Obstacles, and (only together with them) plate-boundary obstacle types.
    if !spec.continent_obstacles.is_empty() {
        args.push("--continent_obstacle_filenames".to_string());
        for obstacle in &spec.continent_obstacles {
            push_path(&mut args, obstacle);
        }
        if !spec.plate_boundary_obstacle_types.is_empty() {
            args.push("--plate_boundary_obstacle_feature_types".to_string());
            args.extend(spec.plate_boundary_obstacle_types.iter().cloned());
        }
    }

    // Topology files.
    args.push("-s".to_string());
    for topology in &spec.topology_files {
        push_path(&mut args, topology);
    }

    args.push("--anchor".to_string());
    args.push(spec.anchor_plate_id.to_string());

    // Age grid for this time.
    args.push("--age_grid_filename".to_string());
    push_path(&mut args, &spec.age_grid.path_for(time));
    args.push("--age_grid_paleo_time".to_string());
    args.push(time.to_string());

    // Topological reconstruction of ocean points advances 1 Myr at a time.
    args.push("--time_increment".to_string());
    args.push("1".to_string());

    // Absent means limited only by the age-grid extent.
    if let Some(ceiling) = spec.max_topological_reconstruction_time {
        args.push("-x".to_string());
        args.push(ceiling.to_string());
    }

    args.push("--ocean_basin_grid_spacing".to_string());
    args.push(number_token(spec.internal_grid_spacing));
    args.push("--upscale_mean_std_dev_grid_spacing".to_string());
    args.push(number_token(spec.grid_spacing));

    // In-line clamping is a request to the engine; the post-processor's own
    // clamp step covers the other mode. Never both.
    if let ClampMode::InEngine(km) = spec.clamp {
        args.push("--clamp_mean_distance".to_string());
        args.push(number_token(km));
    }

    args.push("--output_mean_distance".to_string());
    args.push("--output_grd_files".to_string());

    // Resource hints, only when non-default.
    if spec.workers > 1 {
        args.push("--num_cpus".to_string());
        args.push(spec.workers.to_string());
    }
    if let Some(gb) = spec.memory_per_worker_gb() {
        args.push("--max_memory_usage".to_string());
        args.push(number_token(gb));
    }

    push_path(&mut args, &plan.engine_prefix);
    args
}

/// Builds the raster-math invocation clamping `input` to `threshold_km`
/// (MIN operation), writing `output`
pub fn clamp_command(raster_tool: &str, input: &Path, threshold_km: f64, output: &Path) -> Vec<String> {
    vec![
        raster_tool.to_string(),
        "grdmath".to_string(),
        input.display().to_string(),
        number_token(threshold_km),
        "MIN".to_string(),
        "=".to_string(),
        output.display().to_string(),
    ]
}

/// Builds the sediment-prediction invocation for one time value.
///
/// The distance grid fed in is the canonical output of the distance
/// flavour for the same spacing and time; the profile's constants pass
/// through untouched.
pub fn prediction_command(spec: &JobSpec, profile: &RegressionProfile, time: i32) -> Vec<String> {
    let spacing = number_token(spec.grid_spacing);
    let distance_grid = spec
        .output_dir
        .join(format!("{}.nc", ArtifactPlan::canonical_stem(spec.grid_spacing, time)));
    let output_prefix = spec
        .sediment_output_base
        .join("sedimentation_output")
        .join(profile.output_subdir)
        .join(format!("{}_{time}", profile.file_prefix(spec.grid_spacing)));

    let mut args = vec![
        profile.tool_name(&spec.tools).to_string(),
        "-d".to_string(),
        distance_grid.display().to_string(),
        "-g".to_string(),
        spec.age_grid.path_for(time).display().to_string(),
        "-i".to_string(),
        spacing,
        "-w".to_string(),
        "-m".to_string(),
        profile.mean_age.to_string(),
        profile.mean_distance.to_string(),
        "-v".to_string(),
        profile.variance_age.to_string(),
        profile.variance_distance.to_string(),
        "-x".to_string(),
        profile.max_age.to_string(),
        profile.max_distance.to_string(),
        "-f".to_string(),
    ];
    args.extend(profile.coefficients.iter().map(|c| c.to_string()));

    // Only rate prediction scales (cm/Ky to m/My); thickness does not.
    if let Some(scale) = profile.scale {
        args.push("-s".to_string());
        args.push(number_token(scale));
    }

    args.push("--".to_string());
    args.push(output_prefix.display().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;
    use paleogrid_core::domain::{AgeGridTemplate, ToolNames};
    use paleogrid_core::time::TimeSeries;
    use std::path::PathBuf;

    fn spec() -> JobSpec {
        JobSpec {
            model_name: "test".to_string(),
            output_dir: PathBuf::from("/out/distances_1d"),
            base_dir: PathBuf::from("/out"),
            sediment_output_base: PathBuf::from("/out/sediment_thickness_D17"),
            rotation_files: vec![PathBuf::from("/model/rotations.rot")],
            topology_files: vec![PathBuf::from("/model/topologies.gpml")],
            proximity_features: vec![PathBuf::from("/features/margins.gpmlz")],
            continent_obstacles: vec![PathBuf::from("/model/coastlines.gpmlz")],
            plate_boundary_obstacle_types: vec![
                "MidOceanRidge".to_string(),
                "SubductionZone".to_string(),
            ],
            age_grid: AgeGridTemplate {
                dir: PathBuf::from("/age"),
                filename_prefix: "AgeGrid-".to_string(),
                zero_padding: 3,
                filename_ext: ".nc".to_string(),
            },
            anchor_plate_id: 701,
            internal_grid_spacing: 0.5,
            grid_spacing: 1.0,
            times: TimeSeries::new(0, 10, 1).unwrap(),
            max_topological_reconstruction_time: Some(410),
            clamp: ClampMode::InEngine(3000.0),
            workers: 4,
            memory_budget_gb: Some(32.0),
            generate_thickness_grids: true,
            generate_rate_grids: true,
            lower_process_priority: true,
            tools: ToolNames::default(),
        }
    }

    fn plan(spec: &JobSpec, time: i32) -> ArtifactPlan {
        ArtifactPlan::distance(&spec.output_dir, spec.grid_spacing, time)
    }

    #[test]
    fn test_proximity_command_is_deterministic() {
        let spec = spec();
        let a = proximity_command(&spec, 5, &plan(&spec, 5));
        let b = proximity_command(&spec, 5, &plan(&spec, 5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_proximity_command_core_flags() {
        let spec = spec();
        let args = proximity_command(&spec, 5, &plan(&spec, 5));
        assert_eq!(args[0], "ocean_basin_proximity");
        assert!(args.contains(&"-n".to_string()));
        assert!(args.contains(&"--output_mean_distance".to_string()));
        assert!(args.contains(&"--output_grd_files".to_string()));

        let anchor = args.iter().position(|a| a == "--anchor").unwrap();
        assert_eq!(args[anchor + 1], "701");

        let age = args.iter().position(|a| a == "--age_grid_filename").unwrap();
        assert_eq!(args[age + 1], "/age/AgeGrid-005.nc");

        let ceiling = args.iter().position(|a| a == "-x").unwrap();
        assert_eq!(args[ceiling + 1], "410");

        assert_eq!(args.last().unwrap(), "/out/distances_1d/distance_1d_5");
    }

    #[test]
    fn test_obstacle_types_omitted_with_obstacles() {
        let mut spec = spec();
        spec.continent_obstacles.clear();
        spec.plate_boundary_obstacle_types.clear();
        let args = proximity_command(&spec, 0, &plan(&spec, 0));
        assert!(!args.contains(&"--continent_obstacle_filenames".to_string()));
        assert!(!args.contains(&"--plate_boundary_obstacle_feature_types".to_string()));
    }

    #[test]
    fn test_obstacle_types_follow_obstacles() {
        let spec = spec();
        let args = proximity_command(&spec, 0, &plan(&spec, 0));
        let obstacles = args
            .iter()
            .position(|a| a == "--continent_obstacle_filenames")
            .unwrap();
        let types = args
            .iter()
            .position(|a| a == "--plate_boundary_obstacle_feature_types")
            .unwrap();
        assert!(types > obstacles);
        assert_eq!(args[types + 1], "MidOceanRidge");
    }

    #[test]
    fn test_ceiling_flag_absent_when_unconfigured() {
        let mut spec = spec();
        spec.max_topological_reconstruction_time = None;
        let args = proximity_command(&spec, 0, &plan(&spec, 0));
        assert!(!args.contains(&"-x".to_string()));
    }

    #[test]
    fn test_clamp_flag_only_in_engine_mode() {
        let spec_in_engine = spec();
        let args = proximity_command(&spec_in_engine, 0, &plan(&spec_in_engine, 0));
        let clamp = args.iter().position(|a| a == "--clamp_mean_distance").unwrap();
        assert_eq!(args[clamp + 1], "3000");

        let mut spec_post = spec();
        spec_post.clamp = ClampMode::PostProcess(3000.0);
        let args = proximity_command(&spec_post, 0, &plan(&spec_post, 0));
        assert!(!args.contains(&"--clamp_mean_distance".to_string()));

        let mut spec_none = spec();
        spec_none.clamp = ClampMode::None;
        let args = proximity_command(&spec_none, 0, &plan(&spec_none, 0));
        assert!(!args.contains(&"--clamp_mean_distance".to_string()));
    }

    #[test]
    fn test_resource_hints_only_when_non_default() {
        let spec_multi = spec();
        let args = proximity_command(&spec_multi, 0, &plan(&spec_multi, 0));
        let cpus = args.iter().position(|a| a == "--num_cpus").unwrap();
        assert_eq!(args[cpus + 1], "4");
        let memory = args.iter().position(|a| a == "--max_memory_usage").unwrap();
        assert_eq!(args[memory + 1], "8"); // 32 GB over 4 workers

        let mut spec_single = spec();
        spec_single.workers = 1;
        spec_single.memory_budget_gb = None;
        let args = proximity_command(&spec_single, 0, &plan(&spec_single, 0));
        assert!(!args.contains(&"--num_cpus".to_string()));
        assert!(!args.contains(&"--max_memory_usage".to_string()));
    }

    #[test]
    fn test_clamp_command_shape() {
        let args = clamp_command(
            "gmt",
            Path::new("/out/raw.nc"),
            3000.0,
            Path::new("/out/clamped.nc"),
        );
        assert_eq!(
            args,
            vec!["gmt", "grdmath", "/out/raw.nc", "3000", "MIN", "=", "/out/clamped.nc"]
        );
    }

    #[test]
    fn test_prediction_command_rate_scaling() {
        let spec = spec();
        let args = prediction_command(&spec, &profiles::RATE, 5);
        assert_eq!(args[0], "predict_sedimentation_rate");
        let scale = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[scale + 1], "10");

        let args = prediction_command(&spec, &profiles::THICKNESS, 5);
        assert_eq!(args[0], "predict_sediment_thickness");
        assert!(!args.contains(&"-s".to_string()));
    }

    #[test]
    fn test_prediction_command_paths() {
        let spec = spec();
        let args = prediction_command(&spec, &profiles::THICKNESS, 5);
        let distance = args.iter().position(|a| a == "-d").unwrap();
        assert_eq!(args[distance + 1], "/out/distances_1d/mean_distance_1d_5.nc");
        assert_eq!(
            args.last().unwrap(),
            "/out/sediment_thickness_D17/sedimentation_output/predicted_thickness/sed_thick_1d_5"
        );
    }

    #[test]
    fn test_prediction_coefficients_in_order() {
        let spec = spec();
        let args = prediction_command(&spec, &profiles::RATE, 0);
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], profiles::RATE.coefficients[0].to_string());
        assert_eq!(args[f + 10], profiles::RATE.coefficients[9].to_string());
    }
}
