//! Catalog requests against the mock backend.

#![allow(clippy::unwrap_used)]

use gaming_store_core::{ProductId, ProductType};
use gaming_store_integration_tests::{Endpoint, MockBackend};
use gaming_store_storefront::api::{ApiClient, ApiError, GameFilter};
use gaming_store_storefront::services::{Catalog, CatalogError};
use serde_json::json;

async fn setup() -> (MockBackend, ApiClient, tempfile::TempDir) {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let client = ApiClient::new(&backend.config(dir.path()).unwrap()).unwrap();
    (backend, client, dir)
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_load_full_catalog() {
    let (_backend, client, _dir) = setup().await;

    let catalog = Catalog::load(&client, &GameFilter::default()).await.unwrap();

    assert_eq!(catalog.games.len(), 4);
    assert_eq!(catalog.accessories.len(), 2);

    let pad = catalog
        .find(ProductType::Accessory, &ProductId::new("1"))
        .unwrap();
    assert_eq!(pad.name, "DualSense Wireless Controller");
    assert_eq!(pad.brand.as_deref(), Some("Sony"));

    let headset = catalog
        .find(ProductType::Accessory, &ProductId::new("2"))
        .unwrap();
    assert!(headset.is_out_of_stock());
}

#[tokio::test]
async fn test_filters_become_query_parameters() {
    let (backend, client, _dir) = setup().await;
    let filter = GameFilter {
        category: Some("RPG".to_string()),
        platform: Some("PS5".to_string()),
    };

    let catalog = Catalog::load(&client, &filter).await.unwrap();

    let names: Vec<_> = catalog.games.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Elden Ring"]);

    let query = &backend.recorded().games_queries[0];
    assert_eq!(query.get("category").map(String::as_str), Some("RPG"));
    assert_eq!(query.get("platform").map(String::as_str), Some("PS5"));
}

#[tokio::test]
async fn test_platform_with_spaces_is_encoded() {
    let (_backend, client, _dir) = setup().await;
    let filter = GameFilter {
        category: None,
        platform: Some("Nintendo Switch".to_string()),
    };

    let response = client.games(&filter).await.unwrap();
    assert_eq!(response.games.len(), 1);
    assert_eq!(response.games[0].name, "Zelda: Tears of the Kingdom");
}

#[tokio::test]
async fn test_unsuccessful_games_section_renders_empty() {
    let (backend, client, _dir) = setup().await;
    backend.set_reply(
        Endpoint::Games,
        200,
        json!({"success": false, "message": "Failed to fetch games"}),
    );

    let catalog = Catalog::load(&client, &GameFilter::default()).await.unwrap();
    assert!(catalog.games.is_empty());
    assert_eq!(catalog.accessories.len(), 2);
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let (backend, client, _dir) = setup().await;
    backend.set_reply(Endpoint::Accessories, 500, json!({"success": false}));

    let err = Catalog::load(&client, &GameFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Transport(ApiError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_parse_failure() {
    let (backend, client, _dir) = setup().await;
    backend.set_reply(Endpoint::Accessories, 200, json!({"accessories": []}));

    let err = client.accessories().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_catalog_responses_are_cached() {
    let (backend, client, _dir) = setup().await;

    client.accessories().await.unwrap();
    client.accessories().await.unwrap();
    assert_eq!(backend.recorded().accessories_calls, 1);

    client.invalidate_catalog();
    client.accessories().await.unwrap();
    assert_eq!(backend.recorded().accessories_calls, 2);
}

#[tokio::test]
async fn test_cache_is_keyed_by_filter() {
    let (backend, client, _dir) = setup().await;
    let rpg = GameFilter {
        category: Some("rpg".to_string()),
        platform: None,
    };

    client.games(&GameFilter::default()).await.unwrap();
    client.games(&rpg).await.unwrap();
    client.games(&rpg).await.unwrap();

    assert_eq!(backend.recorded().games_queries.len(), 2);
}

#[tokio::test]
async fn test_unsuccessful_responses_are_not_cached() {
    let (backend, client, _dir) = setup().await;
    backend.set_reply(Endpoint::Accessories, 200, json!({"success": false}));

    client.accessories().await.unwrap();
    client.accessories().await.unwrap();
    assert_eq!(backend.recorded().accessories_calls, 2);
}

#[tokio::test]
async fn test_every_request_carries_a_request_id() {
    let (backend, client, _dir) = setup().await;

    client.games(&GameFilter::default()).await.unwrap();
    client.accessories().await.unwrap();

    let ids = backend.recorded().request_ids;
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(ids[0].len(), 36);
}
