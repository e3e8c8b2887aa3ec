//! VDP-Scout: competitive price scraping for vehicle listings
//!
//! This crate discovers vehicle detail pages through competitor sitemaps,
//! extracts structured vehicle attributes with a language model, and
//! aggregates the results into a downloadable CSV, tracking each run as a
//! background job that clients poll over HTTP.

pub mod config;
pub mod crawler;
pub mod extractor;
pub mod job;
pub mod output;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for VDP-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] crawler::SitemapError),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Job error: {0}")]
    Job(#[from] job::JobError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for VDP-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use job::{Job, JobId, JobRegistry, JobRunner, JobSnapshot, Progress, VehicleRecord};
pub use url::{competitor_label, extract_host, is_vehicle_detail_page};
