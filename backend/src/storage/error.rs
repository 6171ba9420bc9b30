//! Error types for object store operations

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to the object store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store rejected the request
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// The request never produced a service response (dispatch, timeout, decoding)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Client-side configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Upstream service error (5xx from the store)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),
}

impl StorageError {
    /// The underlying message without the variant prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::S3Error(msg)
            | Self::AwsError(msg)
            | Self::ConfigError(msg)
            | Self::UpstreamError(msg) => msg,
        }
    }
}

impl From<aws_sdk_s3::Error> for StorageError {
    fn from(error: aws_sdk_s3::Error) -> Self {
        Self::S3Error(error.to_string())
    }
}

impl<E> From<SdkError<E>> for StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn from(error: SdkError<E>) -> Self {
        match &error {
            SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() >= 500 => {
                Self::UpstreamError(DisplayErrorContext(&error).to_string())
            }
            SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                Self::S3Error(
                    err.message()
                        .or_else(|| err.code())
                        .map_or_else(|| err.to_string(), ToString::to_string),
                )
            }
            _ => Self::AwsError(DisplayErrorContext(&error).to_string()),
        }
    }
}
