//! Integration tests for the HTTP store adapter.

use harvester_core::{ApiStore, ArticleRecord, ArticleStore, StoreError};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(title: &str) -> ArticleRecord {
    let mut record = ArticleRecord::new();
    record.set("title", title);
    record
}

#[tokio::test]
async fn test_create_articles_posts_batch_and_decodes_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects/7/articlesets/42/articles/"))
        .and(header_exists("authorization"))
        .and(body_json(json!([{"title": "a"}, {"title": "b"}])))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{"id": 101, "title": "a"}, {"id": null, "title": "b"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = ApiStore::new(server.uri(), "api-user", "api-secret");
    let batch = vec![record("a"), record("b")];
    let responses = store.create_articles(7, 42, &batch).await.expect("batch should post");

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].id, Some(101));
    assert_eq!(responses[1].id, None);
    assert_eq!(responses[0].fields.get("title"), Some(&json!("a")));
}

#[tokio::test]
async fn test_create_articles_surfaces_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = ApiStore::new(server.uri(), "api-user", "wrong");
    let error = store
        .create_articles(7, 42, &[record("a")])
        .await
        .unwrap_err();

    match error {
        StoreError::Status { status, .. } => assert_eq!(status, 403),
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_articles_surfaces_undecodable_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
        .mount(&server)
        .await;

    let store = ApiStore::new(server.uri(), "api-user", "api-secret");
    let error = store
        .create_articles(7, 42, &[record("a")])
        .await
        .unwrap_err();

    assert!(matches!(error, StoreError::Decode { .. }));
}
