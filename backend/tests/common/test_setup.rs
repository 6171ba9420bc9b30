use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    server,
    storage::{mock::InMemoryObjectStore, StorageGateway},
    types::{Environment, StorageConfig, UrlMode},
};
use tower::ServiceExt;

use super::utils::{multipart_content_type, Part};

pub const TEST_ENDPOINT: &str = "minio.test";
pub const TEST_BUCKET: &str = "gallery";

/// Setup tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

pub fn test_storage_config() -> StorageConfig {
    StorageConfig {
        endpoint: TEST_ENDPOINT.to_string(),
        access_key: "test-access".to_string(),
        secret_key: "test-secret".to_string(),
        bucket: TEST_BUCKET.to_string(),
        url_mode: UrlMode::Public,
    }
}

/// Public URL the gateway is expected to produce for `name`
pub fn expected_url(name: &str) -> String {
    format!("http://{TEST_ENDPOINT}:9000/{TEST_BUCKET}/{name}")
}

/// Router wired to an in-memory object store
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryObjectStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_store(InMemoryObjectStore::new())
    }

    pub fn with_store(store: InMemoryObjectStore) -> Self {
        Self::build(store, Environment::Development)
    }

    pub fn build(store: InMemoryObjectStore, environment: Environment) -> Self {
        setup_test_env();

        let store = Arc::new(store);
        let gateway = Arc::new(StorageGateway::new(store.clone(), test_storage_config()));
        let router = server::router(environment, Some(gateway));

        Self { router, store }
    }

    /// Router for a deployment without storage settings
    pub fn without_storage() -> Router {
        setup_test_env();
        server::router(Environment::Development, None)
    }
}

pub async fn send_get_request(router: &Router, route: &str) -> Response {
    let request = Request::builder()
        .uri(route)
        .method("GET")
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send_post_request(router: &Router, route: &str) -> Response {
    let request = Request::builder()
        .uri(route)
        .method("POST")
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send_multipart_request(router: &Router, route: &str, parts: &[Part<'_>]) -> Response {
    let request = Request::builder()
        .uri(route)
        .method("POST")
        .header("Content-Type", multipart_content_type())
        .body(Body::from(super::utils::multipart_body(parts)))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}
