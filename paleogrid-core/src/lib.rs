//! Paleogrid Core
//!
//! Core types and abstractions for the paleogrid batch orchestrator.
//!
//! This crate contains:
//! - Domain types: JobSpec, Job, artifact naming
//! - Time-series enumeration over geological time ranges
//! - The fatal error taxonomy raised during configuration resolution

pub mod domain;
pub mod error;
pub mod time;
