//! Object store connection settings

use std::env;

use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;

use crate::storage::{
    DEFAULT_PRESIGNED_EXPIRY_SECS, MAX_PRESIGNED_EXPIRY_SECS, STORAGE_API_PORT, STORAGE_REGION,
};

/// How object URLs handed to clients are built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMode {
    /// `http://<endpoint>:9000/<bucket>/<name>`, readable through the public-read policy
    Public,
    /// Signed GET URLs, for deployments where the store's plain port is not reachable
    Presigned {
        /// Lifetime of each URL in seconds
        expiry_secs: u64,
    },
}

/// Connection settings for the object store
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Store host name, without scheme or port
    pub endpoint: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Bucket holding the gallery
    pub bucket: String,
    /// URL flavour returned to clients
    pub url_mode: UrlMode,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("url_mode", &self.url_mode)
            .finish()
    }
}

fn required(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `PRESIGNED_URL_EXPIRY_SECS`, clamped to what SigV4 can sign
fn presigned_expiry() -> u64 {
    let Some(requested) = env::var("PRESIGNED_URL_EXPIRY_SECS")
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
    else {
        return DEFAULT_PRESIGNED_EXPIRY_SECS;
    };

    if requested > MAX_PRESIGNED_EXPIRY_SECS {
        tracing::warn!(
            "PRESIGNED_URL_EXPIRY_SECS={requested} exceeds {MAX_PRESIGNED_EXPIRY_SECS}, clamping"
        );
        return MAX_PRESIGNED_EXPIRY_SECS;
    }

    requested
}

impl StorageConfig {
    /// Reads the store settings from the environment
    ///
    /// Returns `None` unless `MINIO_ENDPOINT`, `MINIO_ACCESS_KEY`, `MINIO_SECRET_KEY`
    /// and `MINIO_BUCKET_NAME` are all set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = required("MINIO_ENDPOINT")?;
        let access_key = required("MINIO_ACCESS_KEY")?;
        let secret_key = required("MINIO_SECRET_KEY")?;
        let bucket = required("MINIO_BUCKET_NAME")?;

        let presigned = env::var("MINIO_USE_PRESIGNED_URLS")
            .is_ok_and(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes"));

        let url_mode = if presigned {
            UrlMode::Presigned {
                expiry_secs: presigned_expiry(),
            }
        } else {
            UrlMode::Public
        };

        Some(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            url_mode,
        })
    }

    /// Base URL of the store's API listener (plain HTTP, fixed port)
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{STORAGE_API_PORT}", self.endpoint)
    }

    /// AWS configuration with static credentials, fixed region and retries disabled
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let credentials = Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            "gallery-static",
        );

        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(STORAGE_REGION))
            .endpoint_url(self.endpoint_url())
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .load()
            .await
    }

    /// S3 service configuration using path-style addressing
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Bucket names are not resolvable as virtual hosts on a self-hosted store
        builder.set_force_path_style(Some(true));

        builder.build()
    }
}
