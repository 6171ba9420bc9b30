use std::sync::Arc;

use axum::{Extension, Json};
use common_types::ConnectionResponse;
use tracing::instrument;

use crate::{
    storage::{ConnectionStatus, StorageGateway},
    types::AppError,
};

/// Checks that the object store is reachable with the configured credentials
///
/// # Errors
///
/// 500 when storage is not configured or the store cannot list buckets
#[instrument(skip(storage))]
pub async fn test_connection(
    Extension(storage): Extension<Option<Arc<StorageGateway>>>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let storage = storage.ok_or_else(AppError::storage_not_configured)?;

    match storage.verify_connectivity().await {
        ConnectionStatus::Connected { buckets } => Ok(Json(ConnectionResponse {
            success: true,
            buckets,
        })),
        ConnectionStatus::Failed { error } => Err(AppError::internal(error)),
    }
}
