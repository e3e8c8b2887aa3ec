use serde::Deserialize;

/// Main configuration structure for VDP-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(rename = "vdp-filter", default)]
    pub vdp_filter: VdpFilterConfig,
    #[serde(default = "default_competitors")]
    pub competitor: Vec<CompetitorEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            user_agent: UserAgentConfig::default(),
            extractor: ExtractorConfig::default(),
            server: ServerConfig::default(),
            output: OutputConfig::default(),
            registry: RegistryConfig::default(),
            vdp_filter: VdpFilterConfig::default(),
            competitor: default_competitors(),
        }
    }
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Maximum number of vehicle detail pages taken from each sitemap
    #[serde(rename = "vdp-limit", default = "default_vdp_limit")]
    pub vdp_limit: usize,

    /// Pause between two pages of the same job (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Timeout for each individual HTTP request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per request before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubled after every failed attempt (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Maximum number of price/vehicle sections kept from a page
    #[serde(rename = "max-sections", default = "default_max_sections")]
    pub max_sections: usize,

    /// Characters of `<body>` kept when no section matched
    #[serde(rename = "max-body-chars", default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            vdp_limit: default_vdp_limit(),
            page_delay_ms: default_page_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            max_sections: default_max_sections(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

/// Language model extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// Chat completion model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the completion
    #[serde(rename = "max-tokens", default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Characters of page HTML sent to the model
    #[serde(rename = "max-html-chars", default = "default_max_html_chars")]
    pub max_html_chars: usize,

    /// Make reported when the model gives none
    #[serde(rename = "default-make", default = "default_make")]
    pub default_make: String,

    /// Timeout for one completion request in seconds
    #[serde(
        rename = "request-timeout-secs",
        default = "default_extractor_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_html_chars: default_max_html_chars(),
            default_make: default_make(),
            request_timeout_secs: default_extractor_timeout_secs(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "listen-addr", default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(rename = "cors-enabled", default)]
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cors_enabled: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one CSV per job
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,

    /// Prefix of the file name offered on download
    #[serde(rename = "download-prefix", default = "default_download_prefix")]
    pub download_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            download_prefix: default_download_prefix(),
        }
    }
}

/// Job registry configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// How long finished jobs stay queryable; unset keeps them forever
    #[serde(rename = "job-retention-secs", default)]
    pub job_retention_secs: Option<u64>,
}

/// Heuristics deciding which sitemap entries are vehicle detail pages
#[derive(Debug, Clone, Deserialize)]
pub struct VdpFilterConfig {
    /// Term every VDP URL must contain (typically the make)
    #[serde(rename = "make-term", default = "default_make_term")]
    pub make_term: String,

    /// URLs containing any of these are never VDPs
    #[serde(rename = "exclude-terms", default = "default_exclude_terms")]
    pub exclude_terms: Vec<String>,
}

impl Default for VdpFilterConfig {
    fn default() -> Self {
        Self {
            make_term: default_make_term(),
            exclude_terms: default_exclude_terms(),
        }
    }
}

/// Maps a host fragment to a competitor display name
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorEntry {
    /// Substring matched against the sitemap host
    pub pattern: String,

    /// Human-readable competitor name
    pub name: String,
}

fn default_vdp_limit() -> usize {
    3
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_max_sections() -> usize {
    10
}

fn default_max_body_chars() -> usize {
    20_000
}

fn default_crawler_name() -> String {
    "VdpScout".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/vdp-scout".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    500
}

fn default_max_html_chars() -> usize {
    15_000
}

fn default_make() -> String {
    "Nissan".to_string()
}

fn default_extractor_timeout_secs() -> u64 {
    60
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_export_dir() -> String {
    "exports".to_string()
}

fn default_download_prefix() -> String {
    "pricing_analysis".to_string()
}

fn default_make_term() -> String {
    "nissan".to_string()
}

fn default_exclude_terms() -> Vec<String> {
    [
        "specials",
        "service",
        "parts",
        "about",
        "contact",
        "hours",
        "staff",
        "blog",
        "news",
        "reviews",
        "directions",
        "finance",
        "trade",
        "sitemap",
        "search",
        "inventory/new",
        "showroom",
        "certified",
        "used",
        "pre-owned",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_competitors() -> Vec<CompetitorEntry> {
    [
        ("gunnnissan", "Gunn Nissan"),
        ("ingrampark", "Ingram Park Nissan"),
        ("nissanboerne", "Nissan of Boerne"),
        ("boerne", "Nissan of Boerne"),
        ("championnissan", "Champion Nissan (New Braunfels)"),
    ]
    .iter()
    .map(|(pattern, name)| CompetitorEntry {
        pattern: pattern.to_string(),
        name: name.to_string(),
    })
    .collect()
}
