//! [`ObjectStore`] backed by `aws-sdk-s3`

use std::time::Duration;

use aws_sdk_s3::{
    error::SdkError,
    operation::head_bucket::HeadBucketError,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::{ObjectStore, StorageError, StorageResult, StoredObject};

/// Region for which S3 rejects an explicit location constraint
const DEFAULT_AWS_REGION: &str = "us-east-1";

/// S3-compatible object store client
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Wraps a pre-configured S3 client
    #[must_use]
    pub const fn new(client: S3Client) -> Self {
        Self { client }
    }
}

fn to_chrono(timestamp: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()))
        .unwrap_or_else(Utc::now)
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let output = self.client.list_buckets().send().await?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(ToString::to_string))
            .collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        let result = self.client.head_bucket().bucket(bucket).send().await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadBucketError::NotFound(_)) =>
            {
                debug!("Bucket does not exist: {bucket}");
                Ok(false)
            }
            Err(e) => {
                error!("Failed to check bucket existence for {bucket}: {e}");
                Err(StorageError::from(e))
            }
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if region != DEFAULT_AWS_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request.send().await?;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let response = page?;
            objects.extend(response.contents().iter().filter_map(|object| {
                object.key().map(|key| StoredObject {
                    name: key.to_string(),
                    size: object
                        .size()
                        .and_then(|size| u64::try_from(size).ok())
                        .unwrap_or_default(),
                    last_modified: to_chrono(object.last_modified()),
                })
            }));
        }

        debug!("Listed {} objects in {bucket}", objects.len());
        Ok(objects)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let content_length = i64::try_from(body.len())
            .map_err(|_| StorageError::ConfigError("object too large".to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(content_length)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigned_config)
            .await?;

        Ok(presigned.uri().to_string())
    }
}
