use crate::common::{
    create_test_config, create_test_registry, mount_dealer_site, mount_extraction_endpoint,
    wait_for_completion,
};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use vdp_scout::server::{build_app, AppState};
use vdp_scout::JobId;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    app: Router,
    server: MockServer,
    _export_dir: TempDir,
}

async fn create_test_app() -> TestApp {
    let server = MockServer::start().await;
    mount_dealer_site(&server).await;
    mount_extraction_endpoint(&server).await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);
    let app = build_app(AppState::new(registry, &config), false);

    TestApp {
        app,
        server,
        _export_dir: export_dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let test = create_test_app().await;
    let (status, body) = get_json(&test.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "vdp_limit": 3}));
}

#[tokio::test]
async fn test_index_page() {
    let test = create_test_app().await;
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, _, body) = send(&test.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("VDP Scout"));
}

#[tokio::test]
async fn test_start_analysis_rejects_empty_sources() {
    let test = create_test_app().await;
    let (status, body) = post_json(
        &test.app,
        "/api/start-analysis",
        json!({"sitemap_urls": ["", "   "], "openai_api_key": "sk-test"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one sitemap URL is required");
}

#[tokio::test]
async fn test_start_analysis_rejects_missing_key() {
    let test = create_test_app().await;
    let (status, body) = post_json(
        &test.app,
        "/api/start-analysis",
        json!({"sitemap_urls": ["https://dealer.example/sitemap.xml"]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OpenAI API key is required");
}

#[tokio::test]
async fn test_unknown_and_malformed_job_ids() {
    let test = create_test_app().await;

    let (status, body) = get_json(&test.app, &format!("/api/job-status/{}", JobId::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");

    let (status, _) = get_json(&test.app, "/api/job-status/not-a-job").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&test.app, &format!("/api/download-csv/{}", JobId::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_before_completion_is_rejected() {
    let test = create_test_app().await;
    Mock::given(method("GET"))
        .and(path("/slow-sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<urlset></urlset>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&test.server)
        .await;

    let (status, body) = post_json(
        &test.app,
        "/api/start-analysis",
        json!({
            "sitemap_urls": [format!("{}/slow-sitemap.xml", test.server.uri())],
            "openai_api_key": "sk-test"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let (status, body) = get_json(&test.app, &format!("/api/download-csv/{}", job_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Job not completed or CSV not available");

    let (status, body) = get_json(&test.app, &format!("/api/job-status/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
    assert_eq!(body["total_results"], 0);
}

#[tokio::test]
async fn test_submit_poll_and_download() {
    let server = MockServer::start().await;
    mount_dealer_site(&server).await;
    mount_extraction_endpoint(&server).await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);
    let app = build_app(AppState::new(registry.clone(), &config), false);

    let (status, body) = post_json(
        &app,
        "/api/start-analysis",
        json!({
            "sitemap_urls": [format!("{}/sitemap.xml", server.uri())],
            "openai_api_key": "sk-test"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Analysis started successfully");

    let job_id: JobId = body["job_id"].as_str().unwrap().parse().unwrap();
    wait_for_completion(&registry, job_id).await;

    let (status, body) = get_json(&app, &format!("/api/job-status/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["completed"], true);
    assert_eq!(body["total_results"], 2);
    assert_eq!(body["total_errors"], 0);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["progress"]["processed_vdps"], 2);
    assert!(body.get("openai_api_key").is_none());

    let uri = format!("/api/download-csv/{}", job_id);
    let (status, headers, first) = send(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"pricing_analysis_"));
    assert!(disposition.ends_with(".csv\""));

    let (_, _, second) = send(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(first, second);
    assert!(String::from_utf8(first)
        .unwrap()
        .starts_with("competitor,url,vin,year,make,model,trim,msrp,sale_price,date_scraped"));
}
