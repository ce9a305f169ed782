//! End-to-end distance batch: YAML document through resolution, dispatch
//! against a fake proximity engine, and artifact post-processing.

#![cfg(unix)]

use paleogrid_core::domain::ClampMode;
use paleogrid_orchestrator::config::WorkflowConfig;
use paleogrid_orchestrator::{resolver, run_distance_batch};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Stand-in for the proximity engine: takes the output prefix as its last
/// argument and writes the grid plus the auxiliary sibling, like the real
/// tool does with --output_grd_files.
fn write_fake_engine(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("fake-proximity");
    fs::write(
        &path,
        "#!/bin/sh\nfor a; do prefix=$a; done\n\
         echo grid-data > ${prefix}_mean_distance.nc\n\
         echo aux-data > ${prefix}_mean_distance.xy\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stand-in for the raster-math tool's grdmath MIN invocation: copies the
/// input grid to the output argument.
fn write_fake_raster(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("fake-gmt");
    fs::write(&path, "#!/bin/sh\ncp \"$2\" \"$6\"\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn workflow_yaml(root: &Path, engine: &Path, extra_workflow_keys: &str) -> String {
    format!(
        r#"
InputFiles:
  model_name: Muller2019
  model_dir: {root}/model
  rotation_files: [rotations.rot]
  topology_files: [topologies.gpml]
  coastline_file: coastlines.gpmlz
  sediment_thickness_features: {root}/model/passive_margins.gpmlz
  agegrid_dir: {root}/agegrids
  agegrid_filename: AgeGrid-
  agegrid_filename_ext: .nc
  agegrid_age_zero_padding: 1
  anchor_plate_id: 0
OutputFiles:
  paleobathymetry_main_output_dir: {root}/runs
  include_date_in_output_dir: "false"
  sediment_thickness_output_dir: sediment
  sediment_thickness_within_main_output_dir: "true"
GridParameters:
  grid_spacing: 1
TimeParameters:
  time_min: 0
  time_max: 2
  time_step: 1
Parameters:
  number_of_cpus: 2
  lower_process_priority: "false"
SedimentThicknessWorkflowParameters:
  sed_distance_internal_grid_spacing: 1
{extra_workflow_keys}
Tools:
  proximity: {engine}
"#,
        root = root.display(),
        engine = engine.display(),
    )
}

#[tokio::test]
async fn test_distance_batch_produces_canonical_grids() {
    let dir = tempfile::tempdir().unwrap();
    let engine = write_fake_engine(dir.path());
    let yaml = workflow_yaml(dir.path(), &engine, "");

    let config = WorkflowConfig::from_yaml(&yaml).unwrap();
    let spec = resolver::resolve(&config).unwrap();
    assert_eq!(spec.clamp, ClampMode::None);
    assert!(spec.output_dir.ends_with("distances_1d"));

    let summary = run_distance_batch(&spec, CancellationToken::new())
        .await
        .unwrap();
    assert!(summary.exit_success());
    assert_eq!(summary.outcomes.len(), 3);

    for time in 0..=2 {
        let canonical = spec.output_dir.join(format!("mean_distance_1d_{time}.nc"));
        assert!(canonical.is_file(), "missing {}", canonical.display());
    }

    // Raw engine outputs and auxiliary siblings are all gone.
    let leftovers: Vec<String> = fs::read_dir(&spec.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with("mean_distance_1d_"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected leftovers: {leftovers:?}");
}

#[tokio::test]
async fn test_distance_batch_with_post_process_clamp() {
    let dir = tempfile::tempdir().unwrap();
    let engine = write_fake_engine(dir.path());
    let raster = write_fake_raster(dir.path());
    let yaml = workflow_yaml(
        dir.path(),
        &engine,
        "  clamp_mean_proximity_kms: 3000\n  clamp_in_engine: \"false\"",
    ) + &format!("  raster: {}\n", raster.display());

    let config = WorkflowConfig::from_yaml(&yaml).unwrap();
    let spec = resolver::resolve(&config).unwrap();
    assert_eq!(spec.clamp, ClampMode::PostProcess(3000.0));

    let summary = run_distance_batch(&spec, CancellationToken::new())
        .await
        .unwrap();
    assert!(summary.exit_success());

    for time in 0..=2 {
        let canonical = spec.output_dir.join(format!("mean_distance_1d_{time}.nc"));
        let contents = fs::read_to_string(&canonical).unwrap();
        assert_eq!(contents.trim(), "grid-data");
        assert!(!spec
            .output_dir
            .join(format!("distance_1d_{time}_mean_distance.nc"))
            .exists());
    }
}

#[tokio::test]
async fn test_batch_reports_engine_failures_per_time() {
    let dir = tempfile::tempdir().unwrap();
    let engine = dir.path().join("broken-proximity");
    fs::write(&engine, "#!/bin/sh\necho no age grid >&2\nexit 2\n").unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();
    let yaml = workflow_yaml(dir.path(), &engine, "");

    let config = WorkflowConfig::from_yaml(&yaml).unwrap();
    let spec = resolver::resolve(&config).unwrap();

    let summary = run_distance_batch(&spec, CancellationToken::new())
        .await
        .unwrap();
    assert!(!summary.exit_success());
    assert_eq!(summary.failures().count(), 3);
    for failure in summary.failures() {
        assert!(failure.error.as_deref().unwrap().contains("no age grid"));
    }
}
