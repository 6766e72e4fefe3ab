mod common;

use std::sync::Arc;

use mockito::Matcher;
use tokenbridge::interceptors::TokenTransport;
use tokenbridge::models::SessionToken;
use tokenbridge::storage::{MemoryStorageArea, StorageArea};
use tokenbridge::{init, BridgeOptions};

use common::{live_key, no_cookies, test_key};

#[tokio::test]
async fn test_production_bearer_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let storage = Arc::new(MemoryStorageArea::new());
    let bridge = init(BridgeOptions::new(live_key(), storage.clone(), no_cookies())).unwrap();
    assert_eq!(bridge.transport(), TokenTransport::BearerHeader);
    bridge
        .handler()
        .set(&SessionToken::new("old-token").unwrap())
        .await;

    let mock = server
        .mock("GET", "/v1/client")
        .match_query(Matcher::UrlEncoded("_is_native".into(), "1".into()))
        .match_header("authorization", "Bearer old-token")
        .match_header("cookie", Matcher::Missing)
        .with_status(200)
        .with_header("authorization", "Bearer new-token")
        .with_body("{}")
        .create_async()
        .await;

    let client = bridge.api_client_for(&server.url()).unwrap();
    let response = client.get("/v1/client").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    mock.assert_async().await;

    assert_eq!(
        storage
            .get(bridge.handler().key().as_str())
            .await
            .unwrap()
            .as_deref(),
        Some("new-token")
    );
}

#[tokio::test]
async fn test_response_without_token_clears_cache() {
    let mut server = mockito::Server::new_async().await;
    let bridge = init(BridgeOptions::new(
        live_key(),
        Arc::new(MemoryStorageArea::new()),
        no_cookies(),
    ))
    .unwrap();
    bridge
        .handler()
        .set(&SessionToken::new("stale").unwrap())
        .await;

    let mock = server
        .mock("POST", "/v1/client/sessions")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = bridge.api_client_for(&server.url()).unwrap();
    let response = client
        .post_json("/v1/client/sessions", &serde_json::json!({ "strategy": "password" }))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    mock.assert_async().await;
    assert_eq!(bridge.handler().get().await, None);
}

#[tokio::test]
async fn test_anonymous_request_is_native() {
    let mut server = mockito::Server::new_async().await;
    let bridge = init(BridgeOptions::new(
        live_key(),
        Arc::new(MemoryStorageArea::new()),
        no_cookies(),
    ))
    .unwrap();

    let mock = server
        .mock("GET", "/v1/environment")
        .match_query(Matcher::UrlEncoded("_is_native".into(), "1".into()))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("authorization", "Bearer first-token")
        .create_async()
        .await;

    let client = bridge.api_client_for(&server.url()).unwrap();
    client.get("/v1/environment").await.unwrap();
    mock.assert_async().await;
    assert_eq!(
        bridge.handler().get().await.unwrap().as_str(),
        "first-token"
    );
}

#[tokio::test]
async fn test_development_query_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let bridge = init(BridgeOptions::new(
        test_key(),
        Arc::new(MemoryStorageArea::new()),
        no_cookies(),
    ))
    .unwrap();
    assert_eq!(bridge.transport(), TokenTransport::DevBrowserQuery);
    bridge
        .handler()
        .set(&SessionToken::new("dev-token").unwrap())
        .await;

    let mock = server
        .mock("GET", "/v1/client")
        .match_query(Matcher::UrlEncoded(
            "__clerk_db_jwt".into(),
            "dev-token".into(),
        ))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("clerk-db-jwt", "dev-token-2")
        .create_async()
        .await;

    let client = bridge.api_client_for(&server.url()).unwrap();
    client.get("/v1/client").await.unwrap();
    mock.assert_async().await;
    assert_eq!(
        bridge.handler().get().await.unwrap().as_str(),
        "dev-token-2"
    );
}

#[tokio::test]
async fn test_set_cookie_lands_in_jar_but_is_not_sent() {
    let mut server = mockito::Server::new_async().await;
    let bridge = init(BridgeOptions::new(
        live_key(),
        Arc::new(MemoryStorageArea::new()),
        no_cookies(),
    ))
    .unwrap();

    let first = server
        .mock("GET", "/v1/client")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("set-cookie", "__client=web-session; Path=/")
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v1/environment")
        .match_query(Matcher::Any)
        .match_header("cookie", Matcher::Missing)
        .with_status(200)
        .create_async()
        .await;

    let client = bridge.api_client_for(&server.url()).unwrap();
    client.get("/v1/client").await.unwrap();
    client.get("/v1/environment").await.unwrap();
    first.assert_async().await;
    second.assert_async().await;
}
