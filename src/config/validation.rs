use crate::config::types::{
    CompetitorEntry, Config, ExtractorConfig, OutputConfig, ScraperConfig, ServerConfig,
    UserAgentConfig, VdpFilterConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extractor_config(&config.extractor)?;
    validate_server_config(&config.server)?;
    validate_output_config(&config.output)?;
    validate_vdp_filter(&config.vdp_filter)?;
    validate_competitors(&config.competitor)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.vdp_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "vdp_limit must be >= 1, got {}",
            config.vdp_limit
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.max_sections < 1 {
        return Err(ConfigError::Validation(
            "max_sections must be >= 1".to_string(),
        ));
    }

    if config.max_body_chars < 1 {
        return Err(ConfigError::Validation(
            "max_body_chars must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates extractor configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max_tokens must be >= 1".to_string(),
        ));
    }

    if config.max_html_chars < 1 {
        return Err(ConfigError::Validation(
            "max_html_chars must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "extractor request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.listen_addr.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "listen_addr '{}' is not a socket address: {}",
            config.listen_addr, e
        ))
    })?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.export_dir.is_empty() {
        return Err(ConfigError::Validation(
            "export_dir cannot be empty".to_string(),
        ));
    }

    if config.download_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "download_prefix cannot be empty".to_string(),
        ));
    }

    if !config
        .download_prefix
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "download_prefix may only contain alphanumerics, '-' and '_', got '{}'",
            config.download_prefix
        )));
    }

    Ok(())
}

/// Validates the VDP filter terms
fn validate_vdp_filter(config: &VdpFilterConfig) -> Result<(), ConfigError> {
    if config.make_term.trim().is_empty() {
        return Err(ConfigError::InvalidPattern(
            "make_term cannot be empty".to_string(),
        ));
    }

    if config.exclude_terms.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "exclude_terms cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates competitor label entries
fn validate_competitors(entries: &[CompetitorEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.pattern.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(format!(
                "Competitor '{}' has an empty pattern",
                entry.name
            )));
        }

        if !entry
            .pattern
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ConfigError::InvalidPattern(format!(
                "Competitor pattern '{}' contains invalid characters",
                entry.pattern
            )));
        }

        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Competitor pattern '{}' has an empty name",
                entry.pattern
            )));
        }
    }

    Ok(())
}
