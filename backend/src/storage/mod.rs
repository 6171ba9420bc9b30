//! Gallery storage operations on top of an S3-compatible object store
mod error;
mod object_store;
mod s3;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use common_types::ImageRecord;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

pub use error::{StorageError, StorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use object_store::mock;
pub use object_store::{ObjectStore, StoredObject};
pub use s3::S3ObjectStore;

use crate::types::{StorageConfig, UrlMode};

/// Region in which the bucket is created when missing
pub const STORAGE_REGION: &str = "us-east-1";

/// Port of the store's plain HTTP API listener
pub const STORAGE_API_PORT: u16 = 9000;

/// Longest lifetime SigV4 accepts for a presigned URL (7 days)
pub const MAX_PRESIGNED_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Default lifetime of presigned GET URLs
pub const DEFAULT_PRESIGNED_EXPIRY_SECS: u64 = MAX_PRESIGNED_EXPIRY_SECS;

/// Extensions (lowercase) that count as images in a listing
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Whether `name` has one of the [`IMAGE_EXTENSIONS`], ignoring case
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, extension)| {
        IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}

/// Policy granting anonymous `s3:GetObject` on every key in `bucket`
#[must_use]
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")]
            }
        ]
    })
    .to_string()
}

/// Result of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Buckets could be listed
    Connected {
        /// Number of buckets visible with the configured credentials
        buckets: usize,
    },
    /// The store could not be reached or rejected the credentials
    Failed {
        /// Underlying error message
        error: String,
    },
}

/// Result of bucket provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The bucket exists and carries the public-read policy
    Configured {
        /// Human-readable confirmation
        message: String,
    },
    /// Creating the bucket or applying the policy failed
    Failed {
        /// Underlying error message
        error: String,
    },
}

/// An object written by [`StorageGateway::upload_object`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Object name inside the bucket
    pub name: String,
    /// URL the object can be fetched from
    pub url: String,
}

/// Gallery operations against the configured bucket
///
/// Every call re-establishes bucket existence and policy; nothing is cached between calls.
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    config: StorageConfig,
}

impl StorageGateway {
    /// Creates a gateway over `store` using `config` for bucket name and URL construction
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        Self { store, config }
    }

    /// Connects to the S3-compatible store described by `config`
    pub async fn connect(config: StorageConfig) -> Self {
        let client = aws_sdk_s3::Client::from_conf(config.s3_client_config().await);
        info!(
            "Initialized object store client for {} (bucket: {})",
            config.endpoint_url(),
            config.bucket
        );
        Self::new(Arc::new(S3ObjectStore::new(client)), config)
    }

    /// Builds a gateway from the environment, or `None` when the storage settings are incomplete
    pub async fn from_env() -> Option<Self> {
        let config = StorageConfig::from_env()?;
        Some(Self::connect(config).await)
    }

    /// Bucket this gateway operates on
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Lists buckets to check that the store is reachable and the credentials are accepted
    #[instrument(skip(self))]
    pub async fn verify_connectivity(&self) -> ConnectionStatus {
        match self.store.list_buckets().await {
            Ok(buckets) => {
                info!("Connection successful, buckets found: {}", buckets.len());
                ConnectionStatus::Connected {
                    buckets: buckets.len(),
                }
            }
            Err(e) => {
                warn!("Connection failed: {e}");
                ConnectionStatus::Failed {
                    error: e.message().to_string(),
                }
            }
        }
    }

    /// Creates the bucket if missing, then (re)applies the public-read policy
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn ensure_bucket_public(&self) -> ProvisionOutcome {
        match self.provision().await {
            Ok(()) => {
                info!("Bucket configured as public");
                ProvisionOutcome::Configured {
                    message: "Bucket configured successfully".to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to configure bucket: {e}");
                ProvisionOutcome::Failed {
                    error: e.message().to_string(),
                }
            }
        }
    }

    async fn provision(&self) -> StorageResult<()> {
        let bucket = self.bucket();

        if !self.store.bucket_exists(bucket).await? {
            self.store.create_bucket(bucket, STORAGE_REGION).await?;
            info!("Created bucket {bucket}");
        }

        self.store
            .put_bucket_policy(bucket, &public_read_policy(bucket))
            .await
    }

    /// Every image in the bucket, newest first
    ///
    /// A missing bucket yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns the store error when the existence check, the listing or URL signing fails
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn list_image_objects(&self) -> StorageResult<Vec<ImageRecord>> {
        if let ProvisionOutcome::Failed { error } = self.ensure_bucket_public().await {
            warn!("Listing without a provisioned bucket: {error}");
        }

        if !self.store.bucket_exists(self.bucket()).await? {
            debug!("Bucket missing, returning empty listing");
            return Ok(Vec::new());
        }

        let objects = self.store.list_objects(self.bucket()).await?;

        let mut images = Vec::new();
        for object in objects.into_iter().filter(|o| is_image_name(&o.name)) {
            images.push(ImageRecord {
                url: self.object_url(&object.name).await?,
                name: object.name,
                size: object.size,
                last_modified: object.last_modified,
            });
        }

        images.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        debug!("Found {} images", images.len());

        Ok(images)
    }

    /// Writes `body` under exactly `name`, overwriting any previous object
    ///
    /// A provisioning failure is logged and the write is attempted anyway. The URL is
    /// built before the write, so a signing failure leaves nothing stored.
    ///
    /// # Errors
    ///
    /// Returns the store error when URL signing or the write fails
    #[instrument(skip(self, body), fields(bucket = %self.config.bucket, size = body.len()))]
    pub async fn upload_object(
        &self,
        name: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<UploadedObject> {
        if let ProvisionOutcome::Failed { error } = self.ensure_bucket_public().await {
            warn!("Uploading without a provisioned bucket: {error}");
        }

        let url = self.object_url(name).await?;

        self.store
            .put_object(self.bucket(), name, body, content_type)
            .await?;
        info!("Uploaded object {name}");

        Ok(UploadedObject {
            name: name.to_string(),
            url,
        })
    }

    /// URL at which the store serves `name` without authentication
    #[must_use]
    pub fn public_url(&self, name: &str) -> String {
        format!("{}/{}/{name}", self.config.endpoint_url(), self.config.bucket)
    }

    /// Time-limited signed GET URL for `name`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` for an expiry the signer rejects (over 7 days)
    pub async fn presigned_url(&self, name: &str, expiry: Duration) -> StorageResult<String> {
        self.store
            .presigned_get_url(self.bucket(), name, expiry)
            .await
    }

    async fn object_url(&self, name: &str) -> StorageResult<String> {
        match self.config.url_mode {
            UrlMode::Public => Ok(self.public_url(name)),
            UrlMode::Presigned { expiry_secs } => {
                self.presigned_url(name, Duration::from_secs(expiry_secs))
                    .await
            }
        }
    }
}
