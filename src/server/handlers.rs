//! HTTP handlers: submission, status polling, download, health

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info, warn};

use super::types::{ErrorResponse, HealthResponse, JobStartedResponse, StartAnalysisRequest};
use super::AppState;
use crate::extractor::Credential;
use crate::job::{JobError, JobId};

const JOB_NOT_FOUND: &str = "Job not found";
const ARTIFACT_UNAVAILABLE: &str = "Job not completed or CSV not available";

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Maps registry errors onto client-facing responses
fn job_error_response(e: JobError) -> Response {
    match e {
        JobError::EmptySources | JobError::MissingCredential => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        JobError::NotFound(_) => error_response(StatusCode::NOT_FOUND, JOB_NOT_FOUND),
        JobError::NotCompleted(_) | JobError::NoArtifact(_) => {
            error_response(StatusCode::BAD_REQUEST, ARTIFACT_UNAVAILABLE)
        }
    }
}

/// Parses a path segment; malformed identifiers are reported as unknown jobs
fn parse_job_id(job_id: &str) -> Result<JobId, Response> {
    job_id
        .parse()
        .map_err(|_| error_response(StatusCode::NOT_FOUND, JOB_NOT_FOUND))
}

/// Landing page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>VDP Scout</title></head>
<body>
<h1>VDP Scout</h1>
<p>Competitive pricing analysis from dealer sitemaps.</p>
<p>Up to {} vehicle detail pages are analyzed per sitemap.</p>
<p>Submit jobs with <code>POST /api/start-analysis</code>.</p>
</body>
</html>"#,
        state.vdp_limit
    ))
}

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        vdp_limit: state.vdp_limit,
    })
}

/// Start an analysis job
pub async fn start_analysis(
    State(state): State<AppState>,
    Json(request): Json<StartAnalysisRequest>,
) -> Response {
    debug!(
        "HTTP start-analysis request: {} sitemap URL(s)",
        request.sitemap_urls.len()
    );

    let credential = Credential::from(request.openai_api_key.trim());
    match state.registry.create(request.sitemap_urls, credential) {
        Ok(job_id) => {
            info!("Started analysis job {}", job_id);
            (
                StatusCode::OK,
                Json(JobStartedResponse {
                    job_id: job_id.to_string(),
                    message: "Analysis started successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Rejected analysis request: {}", e);
            job_error_response(e)
        }
    }
}

/// Get job status
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.registry.get(id) {
        Ok(job) => (StatusCode::OK, Json(job.snapshot())).into_response(),
        Err(e) => job_error_response(e),
    }
}

/// Download the CSV export of a completed job
pub async fn download_csv(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let path = match state.registry.artifact(id) {
        Ok(path) => path,
        Err(e) => return job_error_response(e),
    };

    let body = match tokio::fs::read(&path).await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read export {}: {}", path.display(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read CSV export");
        }
    };

    let filename = format!(
        "{}_{}.csv",
        state.download_prefix,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
