mod common;

use async_trait::async_trait;
use axum_test::TestServer;
use link_resolver::api::handlers::health_handler;
use link_resolver::domain::entities::LinkRecord;
use link_resolver::domain::repositories::{SlugStore, StoreError};
use std::sync::Arc;

fn app(state: link_resolver::AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(health_handler))
        .with_state(state)
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_context();
    let server = TestServer::new(app(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = common::create_test_context();
    let server = TestServer::new(app(ctx.state.clone())).unwrap();

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("click_queue").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let ctx = common::create_test_context();
    let state = ctx.state.clone();
    drop(ctx.clicks);

    let server = TestServer::new(app(state)).unwrap();
    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["click_queue"]["status"], "error");
}

struct UnreachableStore;

#[async_trait]
impl SlugStore for UnreachableStore {
    async fn get(&self, _slug: &str) -> Result<Option<LinkRecord>, StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn put(&self, _record: LinkRecord, _overwrite: bool) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn delete(&self, _slug: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_health_degraded_when_store_unreachable() {
    let ctx = common::create_test_context_with_store(Arc::new(UnreachableStore));
    let server = TestServer::new(app(ctx.state.clone())).unwrap();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    assert_eq!(
        response.json::<serde_json::Value>()["checks"]["store"]["status"],
        "error"
    );
}
