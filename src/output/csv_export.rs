//! CSV export of job results

use crate::job::{JobId, VehicleRecord};
use crate::output::{ExportError, ExportResult, ExportWriter};
use std::fs;
use std::path::PathBuf;

/// Column order of the export
pub const CSV_HEADER: [&str; 10] = [
    "competitor",
    "url",
    "vin",
    "year",
    "make",
    "model",
    "trim",
    "msrp",
    "sale_price",
    "date_scraped",
];

/// Writes one `{job_id}.csv` per job into an export directory
#[derive(Debug, Clone)]
pub struct CsvExportWriter {
    export_dir: PathBuf,
}

impl CsvExportWriter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &PathBuf {
        &self.export_dir
    }
}

impl ExportWriter for CsvExportWriter {
    fn write(&self, job_id: JobId, records: &[VehicleRecord]) -> ExportResult<PathBuf> {
        fs::create_dir_all(&self.export_dir).map_err(|source| ExportError::Io {
            path: self.export_dir.clone(),
            source,
        })?;

        let path = self.export_dir.join(format!("{}.csv", job_id));

        // Header is written explicitly so an empty result set still yields one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(CSV_HEADER)?;

        for record in records {
            writer.write_record([
                record.competitor.clone(),
                record.url.clone(),
                record.vin.to_string(),
                record.year.to_string(),
                record.make.to_string(),
                record.model.to_string(),
                record.trim.to_string(),
                record.msrp.to_string(),
                record.sale_price.to_string(),
                record.date_scraped.clone(),
            ])?;
        }

        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Exported {} records to {}", records.len(), path.display());
        Ok(path)
    }
}
