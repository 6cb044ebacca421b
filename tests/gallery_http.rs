//! Integration tests for the HTTP collection source and a full gallery cycle.

use std::sync::Arc;

use mega_roki::gallery::{
    CollectionSource, GalleryAggregator, GalleryConfig, GalleryError, GalleryView, HttpCollection,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer, keywords: &[&str]) -> GalleryConfig {
    GalleryConfig {
        base_url: format!("{}/v1", server.uri()),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        user_agent: "roki-test/1.0".to_string(),
        ..Default::default()
    }
}

fn object(id: u64) -> serde_json::Value {
    json!({
        "objectID": id,
        "title": format!("Jester {id}"),
        "artistDisplayName": "Unknown",
        "objectDate": "ca. 1500",
        "primaryImage": format!("https://images.example/{id}.jpg"),
        "primaryImageSmall": format!("https://images.example/{id}-small.jpg"),
        "objectURL": format!("https://collection.example/{id}"),
        "medium": "Oil on panel",
        "department": "European Paintings",
        "objectName": "Painting",
        "creditLine": ""
    })
}

async fn mount_search(server: &MockServer, keyword: &str, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", keyword))
        .and(query_param("hasImages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": ids.len(),
            "objectIDs": ids,
        })))
        .mount(server)
        .await;
}

async fn mount_object(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/objects/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(object(id)))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, id: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/objects/{id}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_sends_user_agent_and_decodes_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("user-agent", "roki-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "objectIDs": [30, 10, 20],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpCollection::new(&test_config(&server, &["jester"])).unwrap();
    assert_eq!(source.search("jester").await.unwrap(), vec![30, 10, 20]);
}

#[tokio::test]
async fn test_search_null_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0,
            "objectIDs": null,
        })))
        .mount(&server)
        .await;

    let source = HttpCollection::new(&test_config(&server, &["fool"])).unwrap();
    assert!(source.search("fool").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_object_statuses() {
    let server = MockServer::start().await;
    mount_object(&server, 1).await;
    mount_status(&server, 2, 404).await;
    mount_status(&server, 3, 500).await;

    let source = HttpCollection::new(&test_config(&server, &[])).unwrap();

    let found = source.fetch_object(1).await.unwrap().unwrap();
    assert_eq!(found.object_id, 1);
    assert_eq!(found.department.as_deref(), Some("European Paintings"));

    assert!(source.fetch_object(2).await.unwrap().is_none());
    assert!(matches!(
        source.fetch_object(3).await,
        Err(GalleryError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/objects/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let source = HttpCollection::new(&test_config(&server, &[])).unwrap();
    assert!(matches!(source.fetch_object(9).await, Err(GalleryError::Decode(_))));
}

#[tokio::test]
async fn test_full_cycle_over_http() {
    let server = MockServer::start().await;
    mount_search(&server, "jester", &[5, 3]).await;
    mount_search(&server, "fool", &[3, 8, 4]).await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "court jester"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_object(&server, 5).await;
    mount_object(&server, 3).await;
    mount_status(&server, 8, 404).await;
    mount_object(&server, 4).await;

    let config = test_config(&server, &["jester", "fool", "court jester"]);
    let gallery = GalleryAggregator::new(Arc::new(HttpCollection::new(&config).unwrap()), &config);

    gallery.load_if_needed().await;

    let items = gallery.items();
    let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![5, 3, 4]);
    assert_eq!(items[0].description.as_deref(), Some("Painting"));
    assert_eq!(
        items[0].image_url.as_ref().map(|u| u.as_str()),
        Some("https://images.example/5-small.jpg")
    );
    assert_eq!(gallery.error_message(), None);
    assert_eq!(gallery.network_cycles(), 1);
}

#[tokio::test]
async fn test_server_error_fails_cycle() {
    let server = MockServer::start().await;
    mount_search(&server, "jester", &[1, 2]).await;
    mount_object(&server, 1).await;
    mount_status(&server, 2, 500).await;

    let config = test_config(&server, &["jester"]);
    let gallery = GalleryAggregator::new(Arc::new(HttpCollection::new(&config).unwrap()), &config);

    gallery.reload().await;

    assert!(gallery.items().is_empty());
    match gallery.view() {
        GalleryView::Failed(message) => assert!(message.contains("500")),
        other => panic!("expected failure, got {:?}", other),
    }
}
