use std::sync::Arc;

use axum::{Extension, Json};
use common_types::ListImagesResponse;
use tracing::instrument;

use crate::storage::StorageGateway;

/// Note attached to a listing that degraded to an empty result
pub const LIST_FAILED: &str = "Failed to list images";

/// Lists every image in the bucket, newest first
///
/// Always answers 200. Without storage settings the list is empty; when the store fails
/// the list is empty and `error` is set, so the gallery keeps rendering during an outage.
#[instrument(skip(storage))]
pub async fn list_images(
    Extension(storage): Extension<Option<Arc<StorageGateway>>>,
) -> Json<ListImagesResponse> {
    let Some(storage) = storage else {
        tracing::debug!("Storage not configured, returning empty listing");
        return Json(ListImagesResponse::empty(None));
    };

    match storage.list_image_objects().await {
        Ok(images) => {
            tracing::info!("Listed {} images", images.len());
            Json(ListImagesResponse::new(images))
        }
        Err(e) => {
            tracing::error!("Error listing images: {e}");
            Json(ListImagesResponse::empty(Some(LIST_FAILED.to_string())))
        }
    }
}
