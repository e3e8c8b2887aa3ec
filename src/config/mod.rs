//! Configuration module for VDP-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use vdp_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Each sitemap yields at most {} pages", config.scraper.vdp_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CompetitorEntry, Config, ExtractorConfig, OutputConfig, RegistryConfig, ScraperConfig,
    ServerConfig, UserAgentConfig, VdpFilterConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
