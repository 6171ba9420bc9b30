use std::sync::Arc;

use axum::{Extension, Json};
use common_types::SetupResponse;
use tracing::instrument;

use crate::{
    storage::{ProvisionOutcome, StorageGateway},
    types::AppError,
};

/// Creates the bucket if needed and applies the public-read policy
///
/// # Errors
///
/// 500 when storage is not configured or provisioning fails
#[instrument(skip(storage))]
pub async fn setup_bucket(
    Extension(storage): Extension<Option<Arc<StorageGateway>>>,
) -> Result<Json<SetupResponse>, AppError> {
    let storage = storage.ok_or_else(AppError::storage_not_configured)?;

    match storage.ensure_bucket_public().await {
        ProvisionOutcome::Configured { message } => Ok(Json(SetupResponse {
            success: true,
            message,
        })),
        ProvisionOutcome::Failed { error } => Err(AppError::internal(error)),
    }
}
