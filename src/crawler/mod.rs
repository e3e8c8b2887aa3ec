//! Crawler module for sitemap discovery and page fetching
//!
//! This module contains the page-fetching side of a job, including:
//! - HTTP fetching with retry and exponential backoff
//! - Sitemap parsing and vehicle detail page selection
//! - HTML section extraction for the vehicle-data extractor
//!
//! The job runner only sees the [`PageFetcher`] trait; [`HttpFetcher`] is the
//! production implementation.

mod fetcher;
mod parser;
mod sitemap;

pub use fetcher::{build_http_client, fetch_text, format_user_agent, FetchError, RetryPolicy};
pub use parser::{parse_vehicle_page, truncate_chars, ParsedPage};
pub use sitemap::{
    parse_sitemap_xml, select_vehicle_pages, SitemapDocument, SitemapError, SitemapKind,
};

use crate::config::{Config, VdpFilterConfig};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// A fetched vehicle detail page, reduced to what extraction needs
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// URL the page was requested from
    pub url: String,

    /// Relevant HTML sections of the page
    pub content: String,

    /// Page title, empty when the page has none
    pub title: String,
}

/// Source of sitemap entries and page content for a job
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the vehicle detail pages listed by a sitemap, in document
    /// order and capped at the configured limit
    async fn parse_sitemap(&self, locator: &str) -> Result<Vec<String>, SitemapError>;

    /// Fetches one vehicle detail page
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// HTTP implementation of [`PageFetcher`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    filter: VdpFilterConfig,
    vdp_limit: usize,
    max_sections: usize,
    max_body_chars: usize,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to fetch
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.scraper)?;
        Ok(Self {
            client,
            retry: RetryPolicy::from_config(&config.scraper),
            filter: config.vdp_filter.clone(),
            vdp_limit: config.scraper.vdp_limit,
            max_sections: config.scraper.max_sections,
            max_body_chars: config.scraper.max_body_chars,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn parse_sitemap(&self, locator: &str) -> Result<Vec<String>, SitemapError> {
        let base = Url::parse(locator).map_err(|source| SitemapError::InvalidLocator {
            locator: locator.to_string(),
            source,
        })?;

        let xml = fetch_text(&self.client, base.as_str(), self.retry).await?;
        let document = parse_sitemap_xml(&xml, &base)?;

        if document.kind == SitemapKind::Index {
            tracing::warn!(
                "{} is a sitemap index; nested sitemaps are not followed",
                locator
            );
        }

        let pages = select_vehicle_pages(&document.locations, &self.filter, self.vdp_limit);
        tracing::debug!(
            "Sitemap {} listed {} locations, {} selected",
            locator,
            document.locations.len(),
            pages.len()
        );

        Ok(pages)
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let html = fetch_text(&self.client, url, self.retry).await?;
        let parsed = parse_vehicle_page(&html, self.max_sections, self.max_body_chars);

        Ok(FetchedPage {
            url: url.to_string(),
            content: parsed.content,
            title: parsed.title.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.scraper.vdp_limit = 2;
        config.scraper.retry_base_delay_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_parse_sitemap_over_http() {
        let server = MockServer::start().await;
        let base = server.uri();

        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/new-nissan-rogue-detail-1</loc></url>
  <url><loc>{base}/about-us</loc></url>
  <url><loc>{base}/new-nissan-kicks-detail-2</loc></url>
  <url><loc>{base}/new-nissan-frontier-detail-3</loc></url>
</urlset>"#
        );

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let pages = fetcher
            .parse_sitemap(&format!("{}/sitemap.xml", base))
            .await
            .unwrap();

        assert_eq!(
            pages,
            vec![
                format!("{}/new-nissan-rogue-detail-1", base),
                format!("{}/new-nissan-kicks-detail-2", base),
            ]
        );
    }

    #[tokio::test]
    async fn test_parse_sitemap_invalid_locator() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.parse_sitemap("not a url").await;
        assert!(matches!(result, Err(SitemapError::InvalidLocator { .. })));
    }

    #[tokio::test]
    async fn test_parse_sitemap_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher
            .parse_sitemap(&format!("{}/sitemap.xml", server.uri()))
            .await;
        assert!(matches!(
            result,
            Err(SitemapError::Fetch(FetchError::Status { status: 404, .. }))
        ));
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vdp"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><title>2025 Nissan Kicks</title></head>
                <body><div class="vehicle-info">VIN 3N1CP5DV0SL123456</div></body></html>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = format!("{}/vdp", server.uri());
        let page = fetcher.fetch_page(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert_eq!(page.title, "2025 Nissan Kicks");
        assert!(page.content.contains("3N1CP5DV0SL123456"));
    }
}
