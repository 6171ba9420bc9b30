use std::sync::Arc;

use backend::{server, storage::StorageGateway, types::Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; settings may come from the real environment
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    environment.init_tracing();

    let storage = StorageGateway::from_env().await.map(Arc::new);
    if storage.is_none() {
        tracing::warn!("MinIO configuration not available, storage endpoints will report errors");
    }

    server::start(environment, storage).await
}
