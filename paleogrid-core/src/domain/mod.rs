//! Core domain types
//!
//! These types represent one fully resolved orchestration run and the units
//! of work derived from it. They are shared between the orchestrator (which
//! builds and dispatches jobs) and the CLI (which reports outcomes).

pub mod artifact;
pub mod job;
pub mod spec;

pub use artifact::ArtifactPlan;
pub use job::{BatchSummary, Job, JobOutcome, JobStatus};
pub use spec::{AgeGridTemplate, ClampMode, JobSpec, ToolNames};
