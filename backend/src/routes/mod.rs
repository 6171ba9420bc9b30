mod docs;
pub mod health;
pub mod images;
pub mod setup;
pub mod test_connection;
pub mod upload;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/api/images", get(images::list_images))
        .api_route("/api/upload", post(upload::upload_image))
        .api_route("/api/setup", post(setup::setup_bucket))
        .api_route("/api/test-connection", get(test_connection::test_connection))
}
