//! Analysis jobs
//!
//! This module contains the orchestration core:
//! - [`Job`]: one run, with progress counters, results and errors
//! - [`JobRunner`]: drives a job through sitemap parsing, page fetching,
//!   extraction and export
//! - [`JobRegistry`]: process-wide store that creates, spawns and looks up jobs
//!
//! Only a job's runner mutates it; everyone else reads [`JobSnapshot`]s.

mod registry;
mod runner;
mod state;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::JobRegistry;
pub use runner::JobRunner;
pub use state::{Job, JobSnapshot, RECENT_ERRORS};
pub use types::{JobId, Progress, VehicleRecord};

use thiserror::Error;

/// Errors reported by the registry to its callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("At least one sitemap URL is required")]
    EmptySources,

    #[error("OpenAI API key is required")]
    MissingCredential,

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {0} is not completed yet")]
    NotCompleted(JobId),

    #[error("Job {0} has no export artifact")]
    NoArtifact(JobId),
}
