//! Integration tests for the reference JSON listing scraper.

use harvester_core::{
    FetchClient, FetchConfig, JsonListingScraper, PipelineError, SiteScraper, WorkUnit,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> FetchClient {
    FetchClient::new(FetchConfig::default())
}

#[tokio::test]
async fn test_units_derived_from_json_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "first", "url": "https://example.com/1", "date": "2024-03-01"},
            "https://example.com/2"
        ])))
        .mount(&server)
        .await;

    let scraper = JsonListingScraper::new(format!("{}/listing.json", server.uri()), "tests.listing");
    let units = scraper.units(&client()).await.expect("listing should parse");

    assert_eq!(units.len(), 2);
}

#[tokio::test]
async fn test_object_entry_passes_through_as_record() {
    let scraper = JsonListingScraper::new("https://unused.example.org", "tests.listing");
    let unit = WorkUnit::new(json!({"title": "first", "url": "https://example.com/1"}));

    let record = scraper
        .scrape_unit(&client(), unit)
        .await
        .expect("object entry should scrape")
        .expect("object entry should yield a record");

    assert_eq!(record.get("title"), Some(&json!("first")));
    assert_eq!(record.get("url"), Some(&json!("https://example.com/1")));
}

#[tokio::test]
async fn test_url_entry_fetches_page_and_extracts_title() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article-9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Ninth article</title></head><body>text</body></html>",
        ))
        .mount(&server)
        .await;

    let scraper = JsonListingScraper::new("https://unused.example.org", "tests.listing");
    let article_url = format!("{}/article-9", server.uri());
    let unit = WorkUnit::new(json!(article_url));

    let record = scraper
        .scrape_unit(&client(), unit)
        .await
        .expect("URL entry should scrape")
        .expect("URL entry should yield a record");

    assert_eq!(record.get("title"), Some(&json!("Ninth article")));
    assert_eq!(record.get("url"), Some(&json!(article_url)));
}

#[tokio::test]
async fn test_non_array_listing_is_a_units_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let scraper = JsonListingScraper::new(format!("{}/listing.json", server.uri()), "tests.listing");
    let error = scraper.units(&client()).await.unwrap_err();

    assert!(matches!(error, PipelineError::Units { .. }));
}
