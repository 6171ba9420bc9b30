//! Uploaded file and its validation rules

use bytes::Bytes;
use thiserror::Error;

use super::AppError;

/// Largest accepted upload (5 MiB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Reasons an upload is rejected before anything is written
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    /// The form carries no `file` field
    #[error("No file provided")]
    NoFile,

    /// The declared MIME type is not `image/*`
    #[error("Only image files are allowed")]
    NotAnImage,

    /// The file is larger than [`MAX_UPLOAD_SIZE_BYTES`]
    #[error("File size must be less than 5MB")]
    TooLarge,

    /// The body is not a readable multipart form
    #[error("Invalid form data")]
    InvalidForm,
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        Self::bad_request(rejection.to_string())
    }
}

/// Whether a declared MIME type is accepted as an image
#[must_use]
pub fn is_image_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// The `file` field of an upload form
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// File name as sent by the client
    pub file_name: String,
    /// Declared MIME type, empty when the client sent none
    pub content_type: String,
    /// File content
    pub bytes: Bytes,
}

impl FileUpload {
    /// Checks the declared type, then the size
    ///
    /// # Errors
    ///
    /// Returns the first rule the file breaks
    pub fn validate(&self) -> Result<(), UploadRejection> {
        if !is_image_type(&self.content_type) {
            return Err(UploadRejection::NotAnImage);
        }

        if self.bytes.len() > MAX_UPLOAD_SIZE_BYTES {
            return Err(UploadRejection::TooLarge);
        }

        Ok(())
    }
}
