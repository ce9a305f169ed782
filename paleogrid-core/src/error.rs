//! Error types raised while resolving a run description
//!
//! All of these are fatal: they surface before any job is built, and the
//! offending configuration key is named in the message.

use thiserror::Error;

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors that can occur while resolving configuration into a [`crate::domain::JobSpec`]
#[derive(Debug, Error)]
pub enum SpecError {
    /// A required configuration key is absent
    #[error("configuration key `{0}` is missing")]
    MissingKey(String),

    /// A configuration key is present but its value is unusable
    #[error("configuration key `{key}` is invalid: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key (e.g. `TimeParameters.time_step`)
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The configuration document could not be read or parsed
    #[error("failed to load configuration: {0}")]
    Load(String),

    /// (min, max, step) does not describe a forward time series
    #[error("invalid time range: min={min}, max={max}, step={step}")]
    InvalidTimeRange {
        /// Youngest time in the range
        min: i32,
        /// Oldest time in the range
        max: i32,
        /// Increment between successive times
        step: i32,
    },

    /// Worker count is neither `true` (all processors) nor a positive integer
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(String),
}

impl SpecError {
    /// Create a missing-key error from a dotted key path
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }

    /// Create an invalid-value error from a dotted key path and a reason
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
