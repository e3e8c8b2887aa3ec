//! Output module for exporting job results
//!
//! The job runner hands its accumulated records to an [`ExportWriter`] once
//! every source has been processed. [`CsvExportWriter`] is the production
//! implementation.

mod csv_export;

pub use csv_export::{CsvExportWriter, CSV_HEADER};

use crate::job::{JobId, VehicleRecord};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting results
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Serializes a job's results into a downloadable artifact
pub trait ExportWriter: Send + Sync {
    /// Writes the artifact and returns its location
    ///
    /// # Arguments
    ///
    /// * `job_id` - The job the records belong to
    /// * `records` - Results in discovery order
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the artifact was written
    /// * `Err(ExportError)` - Unrecoverable I/O failure
    fn write(&self, job_id: JobId, records: &[VehicleRecord]) -> ExportResult<PathBuf>;
}
