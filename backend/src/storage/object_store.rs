//! Raw bucket/object primitives of an S3-compatible store

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::StorageResult;

/// Metadata of an object as reported by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
}

/// Bucket and object primitives used by the gallery
///
/// Implementations do not retry and hold no state between calls.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of every bucket visible with the configured credentials
    async fn list_buckets(&self) -> StorageResult<Vec<String>>;

    /// Whether `bucket` exists
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Creates `bucket` in `region`
    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// Replaces the access policy of `bucket` with `policy` (JSON document)
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()>;

    /// Every object in `bucket`, following continuation tokens until the listing is exhausted
    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<StoredObject>>;

    /// Writes `body` under `key`, overwriting any existing object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// A signed GET URL for `key` valid for `expires_in`
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;

    use bytes::Bytes;
    use chrono::{DateTime, Utc};

    use super::{ObjectStore, StoredObject};
    use crate::storage::{StorageError, StorageResult, MAX_PRESIGNED_EXPIRY_SECS};

    /// Object held by the in-memory store
    #[derive(Debug, Clone)]
    pub struct MockObject {
        pub body: Bytes,
        pub content_type: String,
        pub last_modified: DateTime<Utc>,
    }

    /// Bucket held by the in-memory store
    #[derive(Debug, Clone, Default)]
    pub struct MockBucket {
        pub region: String,
        pub policy: Option<String>,
        pub objects: BTreeMap<String, MockObject>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        buckets: HashMap<String, MockBucket>,
        failure: Option<String>,
        policy_failure: Option<String>,
        policy_writes: usize,
        object_writes: usize,
    }

    /// In-memory [`ObjectStore`] used by tests
    #[derive(Debug, Default)]
    pub struct InMemoryObjectStore {
        inner: Mutex<Inner>,
    }

    impl InMemoryObjectStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A store whose every call fails with `message`
        #[must_use]
        pub fn failing(message: &str) -> Self {
            let store = Self::default();
            store.set_failure(Some(message));
            store
        }

        fn lock(&self) -> MutexGuard<'_, Inner> {
            self.inner.lock().expect("mock store lock poisoned")
        }

        fn check(inner: &Inner) -> StorageResult<()> {
            inner
                .failure
                .as_ref()
                .map_or(Ok(()), |msg| Err(StorageError::S3Error(msg.clone())))
        }

        /// Makes every subsequent call fail with `message`, or succeed again with `None`
        pub fn set_failure(&self, message: Option<&str>) {
            self.lock().failure = message.map(ToString::to_string);
        }

        /// Makes `put_bucket_policy` alone fail with `message`, like a key without
        /// `s3:PutBucketPolicy`
        pub fn deny_policy_writes(&self, message: Option<&str>) {
            self.lock().policy_failure = message.map(ToString::to_string);
        }

        /// Seeds an object with an explicit size and timestamp
        pub fn insert_object(
            &self,
            bucket: &str,
            name: &str,
            size: usize,
            last_modified: DateTime<Utc>,
        ) {
            self.lock()
                .buckets
                .entry(bucket.to_string())
                .or_default()
                .objects
                .insert(
                    name.to_string(),
                    MockObject {
                        body: Bytes::from(vec![0u8; size]),
                        content_type: "application/octet-stream".to_string(),
                        last_modified,
                    },
                );
        }

        /// Snapshot of a bucket, if it exists
        #[must_use]
        pub fn bucket(&self, bucket: &str) -> Option<MockBucket> {
            self.lock().buckets.get(bucket).cloned()
        }

        /// Number of successful `put_bucket_policy` calls
        #[must_use]
        pub fn policy_writes(&self) -> usize {
            self.lock().policy_writes
        }

        /// Number of successful `put_object` calls
        #[must_use]
        pub fn object_writes(&self) -> usize {
            self.lock().object_writes
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for InMemoryObjectStore {
        async fn list_buckets(&self) -> StorageResult<Vec<String>> {
            let inner = self.lock();
            Self::check(&inner)?;
            let mut names: Vec<String> = inner.buckets.keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
            let inner = self.lock();
            Self::check(&inner)?;
            Ok(inner.buckets.contains_key(bucket))
        }

        async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
            let mut inner = self.lock();
            Self::check(&inner)?;
            if inner.buckets.contains_key(bucket) {
                return Err(StorageError::S3Error(format!(
                    "BucketAlreadyOwnedByYou: {bucket}"
                )));
            }
            inner.buckets.insert(
                bucket.to_string(),
                MockBucket {
                    region: region.to_string(),
                    ..MockBucket::default()
                },
            );
            Ok(())
        }

        async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()> {
            let mut inner = self.lock();
            Self::check(&inner)?;
            if let Some(message) = &inner.policy_failure {
                return Err(StorageError::S3Error(message.clone()));
            }
            let entry = inner
                .buckets
                .get_mut(bucket)
                .ok_or_else(|| StorageError::S3Error(format!("NoSuchBucket: {bucket}")))?;
            entry.policy = Some(policy.to_string());
            inner.policy_writes += 1;
            Ok(())
        }

        async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<StoredObject>> {
            let inner = self.lock();
            Self::check(&inner)?;
            let entry = inner
                .buckets
                .get(bucket)
                .ok_or_else(|| StorageError::S3Error(format!("NoSuchBucket: {bucket}")))?;
            Ok(entry
                .objects
                .iter()
                .map(|(name, object)| StoredObject {
                    name: name.clone(),
                    size: object.body.len() as u64,
                    last_modified: object.last_modified,
                })
                .collect())
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> StorageResult<()> {
            let mut inner = self.lock();
            Self::check(&inner)?;
            let entry = inner
                .buckets
                .get_mut(bucket)
                .ok_or_else(|| StorageError::S3Error(format!("NoSuchBucket: {bucket}")))?;
            entry.objects.insert(
                key.to_string(),
                MockObject {
                    body,
                    content_type: content_type.to_string(),
                    last_modified: Utc::now(),
                },
            );
            inner.object_writes += 1;
            Ok(())
        }

        async fn presigned_get_url(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            let inner = self.lock();
            Self::check(&inner)?;
            // Same ceiling as SigV4 query signing
            if expires_in.as_secs() > MAX_PRESIGNED_EXPIRY_SECS {
                return Err(StorageError::ConfigError(format!(
                    "presigned URL expiry {}s exceeds {MAX_PRESIGNED_EXPIRY_SECS}s",
                    expires_in.as_secs()
                )));
            }
            Ok(format!(
                "http://presigned.test/{bucket}/{key}?X-Amz-Expires={}",
                expires_in.as_secs()
            ))
        }
    }
}
