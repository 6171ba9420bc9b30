use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An image stored in the gallery bucket, as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Object name inside the bucket
    pub name: String,
    /// URL the browser can load the image from
    pub url: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time of the object (RFC 3339)
    #[schemars(with = "String")]
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ListImagesResponse {
    pub success: bool,
    /// Images sorted by last modification time, newest first
    pub images: Vec<ImageRecord>,
    pub count: usize,
    /// Set when the listing degraded to an empty result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListImagesResponse {
    #[must_use]
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self {
            success: true,
            count: images.len(),
            images,
            error: None,
        }
    }

    /// An empty but successful listing, optionally carrying a degradation note
    #[must_use]
    pub const fn empty(error: Option<String>) -> Self {
        Self {
            success: true,
            images: Vec::new(),
            count: 0,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Final object name (`<epoch-millis>-<sanitized original name>`)
    pub file_name: String,
    pub file_url: String,
    /// Size in bytes of the uploaded file
    pub size: u64,
    /// Declared MIME type
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SetupResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionResponse {
    pub success: bool,
    /// Number of buckets visible with the configured credentials
    pub buckets: usize,
}

/// Error envelope shared by every endpoint that can fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Underlying cause, when one is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
