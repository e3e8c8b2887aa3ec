//! Job runner - drives one job through its pipeline
//!
//! Sources are processed strictly in submission order and pages strictly in
//! discovery order. A failing sitemap or page is recorded as one error
//! entry and skipped; only the final export stage can fail the job.

use crate::config::CompetitorEntry;
use crate::crawler::{FetchError, PageFetcher};
use crate::extractor::{ExtractorProvider, VehicleExtractor};
use crate::job::{Job, VehicleRecord};
use crate::output::{ExportError, ExportWriter};
use crate::url::competitor_label;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Format of the per-record extraction timestamp
const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Executes jobs against injected collaborators
///
/// One runner is shared by every job; it holds no per-job state, so
/// concurrent runs never interfere.
pub struct JobRunner {
    fetcher: Arc<dyn PageFetcher>,
    extractors: Arc<dyn ExtractorProvider>,
    exporter: Arc<dyn ExportWriter>,
    competitors: Vec<CompetitorEntry>,
    page_delay: Duration,
}

impl JobRunner {
    /// Creates a runner
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Sitemap and page source
    /// * `extractors` - Builds an extractor for each job's credential
    /// * `exporter` - Writes the final artifact
    /// * `competitors` - Pattern table for competitor labels
    /// * `page_delay` - Pause between consecutive pages of one source
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractors: Arc<dyn ExtractorProvider>,
        exporter: Arc<dyn ExportWriter>,
        competitors: Vec<CompetitorEntry>,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractors,
            exporter,
            competitors,
            page_delay,
        }
    }

    /// Runs `job` to a terminal state
    ///
    /// On return the job is always `completed`: either with an export
    /// artifact, or with an `error: ...` status and a critical error entry.
    pub async fn run(&self, job: Arc<Job>) {
        let span = tracing::info_span!("job", job_id = %job.id());

        async {
            tracing::info!("Starting analysis of {} source(s)", job.sources().len());

            match self.execute(&job).await {
                Ok(()) => {
                    let snapshot = job.snapshot();
                    tracing::info!(
                        "Analysis completed with {} result(s) and {} error(s)",
                        snapshot.total_results,
                        snapshot.total_errors
                    );
                }
                Err(e) => {
                    tracing::error!("Analysis failed: {}", e);
                    job.fail(&e.to_string());
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, job: &Job) -> Result<(), ExportError> {
        job.set_status("running");
        let extractor = self.extractors.extractor(job.credential());

        for (offset, source) in job.sources().iter().enumerate() {
            let index = offset + 1;
            let label = competitor_label(source, &self.competitors);
            job.begin_competitor(&label, index);

            match self.fetcher.parse_sitemap(source).await {
                Ok(pages) => {
                    job.set_total_vdps(pages.len());
                    tracing::info!("{}: {} vehicle page(s) selected", label, pages.len());
                    self.process_pages(job, &label, &pages, extractor.as_ref())
                        .await;
                }
                Err(e) => {
                    tracing::warn!("Sitemap {} failed: {}", source, e);
                    job.record_error(format!("Error processing sitemap {}: {}", source, e));
                }
            }

            job.finish_competitor(index);
        }

        job.set_status("Generating CSV");
        let path = self.exporter.write(job.id(), &job.results())?;
        tracing::info!("Results exported to {}", path.display());
        job.complete(path);

        Ok(())
    }

    async fn process_pages(
        &self,
        job: &Job,
        label: &str,
        pages: &[String],
        extractor: &dyn VehicleExtractor,
    ) {
        for (offset, url) in pages.iter().enumerate() {
            job.begin_vdp(offset + 1);

            match self.process_page(label, url, extractor).await {
                Ok(record) => job.record_result(record),
                Err(e) => {
                    tracing::warn!("Page {} failed: {}", url, e);
                    job.record_page_error(format!("Error processing {}: {}", url, e));
                }
            }

            if offset + 1 < pages.len() && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }
    }

    async fn process_page(
        &self,
        label: &str,
        url: &str,
        extractor: &dyn VehicleExtractor,
    ) -> Result<VehicleRecord, FetchError> {
        let page = self.fetcher.fetch_page(url).await?;
        let data = extractor.extract(&page).await;
        let scraped_at = chrono::Local::now().format(SCRAPED_AT_FORMAT).to_string();

        tracing::debug!("Extracted {} from {}", data.vin, url);
        Ok(VehicleRecord::new(label, url, data, scraped_at))
    }
}
