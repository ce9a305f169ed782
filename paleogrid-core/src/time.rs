//! Geological time-series enumeration
//!
//! A run processes one job per time value in `min, min+step, ..., <= max`
//! (times in Ma, youngest first). The series is validated once and can be
//! iterated any number of times.

use crate::error::SpecError;
use serde::{Deserialize, Serialize};

/// A validated, restartable series of geological times
///
/// Yields exactly `floor((max - min) / step) + 1` values, strictly
/// increasing, starting at `min` and never exceeding `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    min: i32,
    max: i32,
    step: i32,
}

impl TimeSeries {
    /// Creates a time series, rejecting `step <= 0` or `min > max`
    pub fn new(min: i32, max: i32, step: i32) -> Result<Self, SpecError> {
        if step <= 0 || min > max {
            return Err(SpecError::InvalidTimeRange { min, max, step });
        }
        Ok(Self { min, max, step })
    }

    /// Youngest time in the series
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Oldest configured time (the last yielded value may be younger)
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Increment between successive times
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Number of times the series yields
    pub fn len(&self) -> usize {
        ((self.max - self.min) / self.step) as usize + 1
    }

    /// A series never yields zero times (min <= max is enforced)
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the series from the beginning
    pub fn iter(&self) -> impl Iterator<Item = i32> + use<> {
        (self.min..=self.max).step_by(self.step as usize)
    }
}

impl IntoIterator for &TimeSeries {
    type Item = i32;
    type IntoIter = std::iter::StepBy<std::ops::RangeInclusive<i32>>;

    fn into_iter(self) -> Self::IntoIter {
        (self.min..=self.max).step_by(self.step as usize)
    }
}
