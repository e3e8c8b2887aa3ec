//! HTTP API request/response types

use serde::{Deserialize, Serialize};

/// Body of `POST /api/start-analysis`
#[derive(Debug, Clone, Deserialize)]
pub struct StartAnalysisRequest {
    /// Competitor sitemap URLs; blank entries are ignored
    #[serde(default)]
    pub sitemap_urls: Vec<String>,

    #[serde(default)]
    pub openai_api_key: String,
}

/// Response for a started job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStartedResponse {
    pub job_id: String,
    pub message: String,
}

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub vdp_limit: usize,
}
