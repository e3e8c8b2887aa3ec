//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made on behalf of a job:
//! - Building the HTTP client with a proper user agent string and timeout
//! - GET requests for sitemaps and vehicle detail pages
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::{ScraperConfig, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors raised once every attempt to fetch a URL has failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Returns true if another attempt might succeed
    ///
    /// Server errors, timeouts and connection problems are transient;
    /// client errors (4xx) are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout { .. } | Self::Network { .. } | Self::Body { .. } => true,
        }
    }
}

/// How often and how patiently a request is retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay after the first failure; doubled after each further failure
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Builds the policy from scraper configuration
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Backoff delay after the given zero-based failed attempt
    ///
    /// | Attempt | Delay |
    /// |---------|-------|
    /// | 0 | base |
    /// | 1 | base × 2 |
    /// | 2 | base × 4 |
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Builds an HTTP client with proper configuration
///
/// Dealer sites routinely reject unknown agents, so the user agent keeps a
/// browser-compatible prefix followed by the scraper's own identification.
///
/// # Example
///
/// ```no_run
/// use vdp_scout::config::Config;
/// use vdp_scout::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.scraper).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    scraper: &ScraperConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(scraper.request_timeout_secs))
        .connect_timeout(Duration::from_secs(scraper.request_timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent string
///
/// Format: `Mozilla/5.0 (compatible; Name/Version; +ContactURL)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "Mozilla/5.0 (compatible; {}/{}; +{})",
        config.crawler_name, config.crawler_version, config.contact_url
    )
}

/// Fetches a URL body as text, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 4xx (except 429) | Fail immediately |
/// | HTTP 429 / 5xx | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Connection error | Retry with backoff |
///
/// The last error is returned once `policy.max_attempts` attempts failed.
pub async fn fetch_text(client: &Client, url: &str, policy: RetryPolicy) -> Result<String, FetchError> {
    let mut attempt = 0;

    loop {
        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Attempt {} for {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    url,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Performs a single GET request
async fn fetch_once(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
