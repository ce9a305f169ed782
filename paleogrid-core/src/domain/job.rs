//! Job domain types
//!
//! One job is one external invocation for one time value. Jobs are
//! independent of each other (embarrassingly parallel), so the only ordering
//! guarantee anywhere is that a job's post-processing follows its own
//! subprocess exit.

use super::artifact::ArtifactPlan;
use serde::{Deserialize, Serialize};

/// One unit of orchestrated work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Geological time this job produces a grid for (Ma)
    pub time: i32,
    /// Full external command, program first
    pub command: Vec<String>,
    /// Post-processing plan; `None` when the tool already writes the
    /// canonical name (sedimentation flavour)
    pub artifact: Option<ArtifactPlan>,
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// Terminal record for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub time: i32,
    pub status: JobStatus,
    /// Retained error message for Failed jobs
    pub error: Option<String>,
}

impl JobOutcome {
    /// Job ran and its post-processing completed
    pub fn succeeded(time: i32) -> Self {
        Self {
            time,
            status: JobStatus::Succeeded,
            error: None,
        }
    }

    /// Job's subprocess failed to launch, exited non-zero, or its
    /// post-processing failed
    pub fn failed(time: i32, error: impl Into<String>) -> Self {
        Self {
            time,
            status: JobStatus::Failed,
            error: Some(error.into()),
        }
    }

    /// Job was still queued when cancellation was observed; it never started
    pub fn cancelled(time: i32) -> Self {
        Self {
            time,
            status: JobStatus::Cancelled,
            error: None,
        }
    }
}

/// Aggregated result of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One terminal outcome per submitted job
    pub outcomes: Vec<JobOutcome>,
    /// Whether cancellation was requested at any point during the run
    pub cancellation_requested: bool,
}

impl BatchSummary {
    /// Number of jobs with the given terminal status
    pub fn count(&self, status: JobStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Jobs that ended Failed, with their retained errors
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == JobStatus::Failed)
    }

    /// Exit-code policy: zero on full success, and on a clean
    /// user-requested cancellation
    pub fn exit_success(&self) -> bool {
        self.count(JobStatus::Failed) == 0 || self.cancellation_requested
    }

    /// One-line operator summary, e.g. `3 succeeded, 1 failed, 2 cancelled`
    pub fn describe(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} cancelled",
            self.count(JobStatus::Succeeded),
            self.count(JobStatus::Failed),
            self.count(JobStatus::Cancelled)
        )
    }
}
