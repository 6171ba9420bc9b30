use std::sync::{Arc, LazyLock};

use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use common_types::UploadResponse;
use regex::Regex;
use tracing::instrument;

use crate::{
    storage::StorageGateway,
    types::{AppError, FileForm, UploadRejection},
};

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.-]").expect("Invalid regex"));

/// Object name for an upload: `<epoch-millis>-<original name restricted to [A-Za-z0-9.-]>`
#[must_use]
pub fn storage_name(original_name: &str, uploaded_at: DateTime<Utc>) -> String {
    format!(
        "{}-{}",
        uploaded_at.timestamp_millis(),
        UNSAFE_NAME_CHARS.replace_all(original_name, "")
    )
}

/// Stores an uploaded image in the bucket
///
/// Checks, first failure wins:
/// 1. storage is configured (500), before the body is read
/// 2. the body is a multipart form with a `file` field (400)
/// 3. the declared type is `image/*` (400)
/// 4. the file is at most 5 MiB (400)
///
/// Two uploads of the same name within the same millisecond overwrite each other.
///
/// # Errors
///
/// 400 for rejected input, 500 when storage is missing or the write fails
#[instrument(skip(storage, form))]
pub async fn upload_image(
    Extension(storage): Extension<Option<Arc<StorageGateway>>>,
    form: FileForm,
) -> Result<Json<UploadResponse>, AppError> {
    let storage = storage.ok_or_else(AppError::storage_not_configured)?;

    let file = form.into_file().await?.ok_or(UploadRejection::NoFile)?;
    file.validate()?;

    let name = storage_name(&file.file_name, Utc::now());
    let size = file.bytes.len() as u64;
    tracing::info!(
        "Uploading {} as {name} ({size} bytes, {})",
        file.file_name,
        file.content_type
    );

    let uploaded = storage
        .upload_object(&name, file.bytes, &file.content_type)
        .await
        .map_err(|e| AppError::internal("Upload failed").with_details(e.message()))?;

    Ok(Json(UploadResponse {
        success: true,
        file_name: uploaded.name,
        file_url: uploaded.url,
        size,
        content_type: file.content_type,
    }))
}
