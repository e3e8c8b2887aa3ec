//! In-memory collaborators for exercising the runner and registry

use crate::crawler::{FetchError, FetchedPage, PageFetcher, SitemapError};
use crate::extractor::{
    Credential, ExtractorProvider, Field, VehicleData, VehicleExtractor,
};
use crate::job::{JobId, JobRunner, VehicleRecord};
use crate::output::{ExportError, ExportResult, ExportWriter};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves canned sitemaps and pages
#[derive(Default)]
pub struct StubFetcher {
    sitemaps: HashMap<String, Vec<String>>,
    broken_sitemaps: HashSet<String>,
    failing_pages: HashSet<String>,
    slow_pages: HashMap<String, Duration>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sitemap(mut self, locator: &str, pages: &[&str]) -> Self {
        self.sitemaps.insert(
            locator.to_string(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn broken_sitemap(mut self, locator: &str) -> Self {
        self.broken_sitemaps.insert(locator.to_string());
        self
    }

    pub fn failing_page(mut self, url: &str) -> Self {
        self.failing_pages.insert(url.to_string());
        self
    }

    pub fn slow_page(mut self, url: &str, delay: Duration) -> Self {
        self.slow_pages.insert(url.to_string(), delay);
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn parse_sitemap(&self, locator: &str) -> Result<Vec<String>, SitemapError> {
        if self.broken_sitemaps.contains(locator) {
            return Err(SitemapError::NotASitemap);
        }
        self.sitemaps
            .get(locator)
            .cloned()
            .ok_or_else(|| SitemapError::Fetch(FetchError::Status {
                url: locator.to_string(),
                status: 404,
            }))
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if let Some(delay) = self.slow_pages.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_pages.contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(FetchedPage {
            url: url.to_string(),
            content: format!("<div class=\"price\">{}</div>", url),
            title: "Stub".to_string(),
        })
    }
}

/// Extractor that echoes the page URL into the model field
pub struct EchoExtractor;

#[async_trait]
impl VehicleExtractor for EchoExtractor {
    async fn extract(&self, page: &FetchedPage) -> VehicleData {
        VehicleData {
            model: Field::Present(page.url.clone()),
            ..VehicleData::unavailable("Nissan")
        }
    }
}

/// Hands out [`EchoExtractor`]s and remembers which credentials it saw
#[derive(Default)]
pub struct EchoProvider {
    pub credentials: Mutex<Vec<String>>,
}

impl ExtractorProvider for EchoProvider {
    fn extractor(&self, credential: &Credential) -> Arc<dyn VehicleExtractor> {
        if let Ok(mut seen) = self.credentials.lock() {
            seen.push(credential.expose().to_string());
        }
        Arc::new(EchoExtractor)
    }
}

/// Records what it was asked to export, optionally failing
#[derive(Default)]
pub struct MemoryExporter {
    pub fail: bool,
    pub written: Mutex<Vec<(JobId, Vec<VehicleRecord>)>>,
}

impl MemoryExporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl ExportWriter for MemoryExporter {
    fn write(&self, job_id: JobId, records: &[VehicleRecord]) -> ExportResult<PathBuf> {
        if self.fail {
            return Err(ExportError::Io {
                path: PathBuf::from("/nowhere"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        if let Ok(mut written) = self.written.lock() {
            written.push((job_id, records.to_vec()));
        }
        Ok(PathBuf::from(format!("/exports/{}.csv", job_id)))
    }
}

/// Runner over stubs with no politeness delay
pub fn create_test_runner(
    fetcher: StubFetcher,
    exporter: Arc<MemoryExporter>,
) -> JobRunner {
    JobRunner::new(
        Arc::new(fetcher),
        Arc::new(EchoProvider::default()),
        exporter,
        crate::config::Config::default().competitor,
        Duration::ZERO,
    )
}
