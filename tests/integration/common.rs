//! Shared fixtures: a mock dealer site, a mock chat-completions endpoint and
//! a registry wired to them with real collaborators.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vdp_scout::config::Config;
use vdp_scout::{Job, JobId, JobRegistry};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EXTRACTION_REPLY: &str = r#"{"vin": "1N4BL4BV0RN123456", "year": "2025", "make": "Nissan", "model": "Rogue", "trim": "SV", "msrp": "$33,000", "sale_price": "31,499"}"#;

/// Creates a configuration pointing every collaborator at `server`
pub fn create_test_config(server: &MockServer, export_dir: &Path) -> Config {
    let mut config = Config::default();
    config.scraper.page_delay_ms = 0;
    config.scraper.retry_base_delay_ms = 1;
    config.scraper.max_retries = 2;
    config.extractor.base_url = format!("{}/v1", server.uri());
    config.output.export_dir = export_dir.display().to_string();
    config
}

/// Serves a sitemap listing two vehicle detail pages and one other page
pub async fn mount_dealer_site(server: &MockServer) {
    let base = server.uri();
    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/new-nissan-rogue-detail-1</loc></url>
  <url><loc>{base}/contact-us</loc></url>
  <url><loc>{base}/new-nissan-rogue-detail-2</loc></url>
</urlset>"#
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(server)
        .await;

    for page in ["/new-nissan-rogue-detail-1", "/new-nissan-rogue-detail-2"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><title>New 2025 Nissan Rogue SV</title></head>
<body><div class="price-box">MSRP $33,000 Sale $31,499</div></body></html>"#,
            ))
            .mount(server)
            .await;
    }
}

/// Serves the same extraction reply for every completion request
pub async fn mount_extraction_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": EXTRACTION_REPLY}}]
        })))
        .mount(server)
        .await;
}

/// Builds a registry with the production fetcher, extractor and exporter
pub fn create_test_registry(config: &Config) -> Arc<JobRegistry> {
    Arc::new(JobRegistry::from_config(config).unwrap())
}

/// Polls until the job completes, failing the test after a few seconds
pub async fn wait_for_completion(registry: &JobRegistry, id: JobId) -> Arc<Job> {
    for _ in 0..500 {
        let job = registry.get(id).unwrap();
        if job.is_completed() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not complete in time", id);
}
