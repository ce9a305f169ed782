//! Sedimentation regression profiles
//!
//! Standardisation statistics and polynomial coefficients for the two
//! prediction tools. These are trained offline (age/distance features,
//! standardised, degree-3 polynomial over the pair) and are opaque
//! constants to the orchestrator: they pass straight through to the tool's
//! command line.

use paleogrid_core::domain::ToolNames;
use paleogrid_core::domain::spec::number_token;

/// One prediction flavour: which tool to run and the constants it needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionProfile {
    /// Operator-facing name of the flavour
    pub name: &'static str,
    /// Scale applied to the predicted value; rate needs cm/Ky -> m/My,
    /// thickness is unscaled
    pub scale: Option<f64>,
    /// Mean of the age feature in the training set
    pub mean_age: f64,
    /// Mean of the distance feature in the training set
    pub mean_distance: f64,
    /// Variance of the age feature
    pub variance_age: f64,
    /// Variance of the distance feature
    pub variance_distance: f64,
    /// Maximum age seen in training; predictions beyond it are unreliable
    pub max_age: f64,
    /// Maximum distance seen in training
    pub max_distance: f64,
    /// Polynomial coefficients, intercept first
    pub coefficients: [f64; 10],
    /// Output subdirectory under `sedimentation_output/`
    pub output_subdir: &'static str,
    /// Basename prefix of emitted grids
    pub basename_prefix: &'static str,
}

/// Predicted sedimentation rate (m/My)
pub const RATE: RegressionProfile = RegressionProfile {
    name: "sedimentation rate",
    scale: Some(10.0),
    mean_age: 61.17716597,
    mean_distance: 1835.10750592,
    variance_age: 1934.78513885,
    variance_distance: 1207587.8548734,
    max_age: 191.87276,
    max_distance: 3000.0,
    coefficients: [
        1.350082937086441,
        -0.26385415,
        -0.07516542,
        0.39197707,
        -0.15475392,
        0.0,
        -0.13196083,
        0.02481208,
        -0.0,
        -0.47570021,
    ],
    output_subdir: "predicted_rate",
    basename_prefix: "sed_rate",
};

/// Predicted sediment thickness (m)
pub const THICKNESS: RegressionProfile = RegressionProfile {
    name: "sediment thickness",
    scale: None,
    mean_age: 61.18406823,
    mean_distance: 1835.28118479,
    variance_age: 1934.6999014,
    variance_distance: 1207521.8995806,
    max_age: 191.87276,
    max_distance: 3000.0,
    coefficients: [
        5.441401190368497,
        0.46893096,
        -0.07320928,
        -0.24077496,
        -0.10840657,
        0.00381672,
        0.06831728,
        0.01179914,
        0.01158149,
        -0.39880562,
    ],
    output_subdir: "predicted_thickness",
    basename_prefix: "sed_thick",
};

impl RegressionProfile {
    /// Executable name this profile invokes
    pub fn tool_name<'a>(&self, tools: &'a ToolNames) -> &'a str {
        if self.scale.is_some() {
            &tools.predict_rate
        } else {
            &tools.predict_thickness
        }
    }

    /// Grid basename prefix embedding the output spacing, e.g. `sed_rate_0.2d`
    pub fn file_prefix(&self, grid_spacing: f64) -> String {
        format!("{}_{}d", self.basename_prefix, number_token(grid_spacing))
    }
}
