use std::time::Duration;

use islandora_export_core::warm::{fetch_url_list, warm_urls, WarmReport};
use reqwest::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_url_list_drops_empty_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"url": "https://iiif.test/a"},
            {"url": ""},
            {"url": "https://iiif.test/b"}
        ])))
        .mount(&server)
        .await;

    let urls = fetch_url_list(&Client::new(), &format!("{}/urls", server.uri()))
        .await
        .unwrap();
    assert_eq!(urls, vec!["https://iiif.test/a", "https://iiif.test/b"]);
}

#[tokio::test]
async fn test_pool_drains_every_url_and_counts_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("img"))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/ok", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/ok", server.uri()),
        format!("{}/slow", server.uri()),
        format!("{}/ok", server.uri()),
    ];
    let report = warm_urls(&Client::new(), urls, 2, Duration::from_millis(200)).await;
    assert_eq!(
        report,
        WarmReport {
            attempted: 5,
            succeeded: 3,
            failed: 2
        }
    );
}

#[tokio::test]
async fn test_empty_list_returns_empty_report() {
    let report = warm_urls(&Client::new(), vec![], 4, Duration::from_secs(1)).await;
    assert_eq!(report, WarmReport::default());
}
