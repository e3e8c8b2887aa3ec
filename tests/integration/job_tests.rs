use crate::common::{
    create_test_config, create_test_registry, mount_dealer_site, mount_extraction_endpoint,
    wait_for_completion,
};
use tempfile::TempDir;
use vdp_scout::extractor::{Credential, Field};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_end_to_end_single_source() {
    let server = MockServer::start().await;
    mount_dealer_site(&server).await;
    mount_extraction_endpoint(&server).await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);

    let id = registry
        .create(
            vec![format!("{}/sitemap.xml", server.uri())],
            Credential::from("sk-test"),
        )
        .unwrap();
    let job = wait_for_completion(&registry, id).await;

    let snapshot = job.snapshot();
    assert_eq!(snapshot.status, "completed");
    assert_eq!(snapshot.total_results, 2);
    assert_eq!(snapshot.total_errors, 0);
    assert_eq!(snapshot.progress.processed_vdps, 2);
    assert_eq!(snapshot.progress.completed_competitors, 1);

    let results = job.results();
    assert_eq!(results[0].url, format!("{}/new-nissan-rogue-detail-1", server.uri()));
    assert_eq!(results[1].url, format!("{}/new-nissan-rogue-detail-2", server.uri()));
    assert_eq!(results[0].vin, Field::Present("1N4BL4BV0RN123456".to_string()));
    assert_eq!(results[0].sale_price.to_string(), "31499.00");

    let artifact = registry.artifact(id).unwrap();
    assert!(artifact.starts_with(export_dir.path()));
    let csv = std::fs::read_to_string(&artifact).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Rogue,SV,33000.00,31499.00"));
}

#[tokio::test]
async fn test_failing_page_is_recorded_and_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let sitemap = format!(
        r#"<urlset>
  <url><loc>{base}/new-nissan-kicks-detail-1</loc></url>
  <url><loc>{base}/new-nissan-kicks-detail-2</loc></url>
  <url><loc>{base}/new-nissan-kicks-detail-3</loc></url>
</urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new-nissan-kicks-detail-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    for page in ["/new-nissan-kicks-detail-1", "/new-nissan-kicks-detail-3"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Kicks</body></html>"))
            .mount(&server)
            .await;
    }
    mount_extraction_endpoint(&server).await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);

    let id = registry
        .create(vec![format!("{}/sitemap.xml", base)], Credential::from("sk-test"))
        .unwrap();
    let job = wait_for_completion(&registry, id).await;

    let urls: Vec<String> = job.results().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/new-nissan-kicks-detail-1", base),
            format!("{}/new-nissan-kicks-detail-3", base),
        ]
    );

    let errors = job.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with(&format!("Error processing {}/new-nissan-kicks-detail-2", base)));
    assert!(registry.artifact(id).is_ok());
}

#[tokio::test]
async fn test_unreachable_sitemap_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);

    let locator = format!("{}/sitemap.xml", server.uri());
    let id = registry
        .create(vec![locator.clone()], Credential::from("sk-test"))
        .unwrap();
    let job = wait_for_completion(&registry, id).await;

    let snapshot = job.snapshot();
    assert_eq!(snapshot.status, "completed");
    assert_eq!(snapshot.total_results, 0);
    assert_eq!(snapshot.errors.len(), 1);
    assert!(snapshot.errors[0].starts_with(&format!("Error processing sitemap {}", locator)));

    let csv = std::fs::read_to_string(registry.artifact(id).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[tokio::test]
async fn test_extraction_outage_yields_unavailable_fields() {
    let server = MockServer::start().await;
    mount_dealer_site(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let export_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, export_dir.path());
    let registry = create_test_registry(&config);

    let id = registry
        .create(
            vec![format!("{}/sitemap.xml", server.uri())],
            Credential::from("sk-test"),
        )
        .unwrap();
    let job = wait_for_completion(&registry, id).await;

    let results = job.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].vin, Field::Unavailable);
    assert_eq!(results[0].make, Field::Present("Nissan".to_string()));
    assert_eq!(job.errors().len(), 0);
}
