//! Object storage backend abstraction (S3/MinIO/local filesystem/memory).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// A single object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// One level of a delimited listing.
///
/// `folders` holds the common prefixes directly under the listed prefix,
/// without a trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub folders: Vec<String>,
    pub files: Vec<ObjectEntry>,
}

/// Handle to the bucket namespace.
///
/// Cloning is cheap; every clone talks to the same backend.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: StoreConfig) -> Result<Self> {
        let storage = match &config {
            StoreConfig::Memory => Self::memory(),

            StoreConfig::Local { path } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(path).await?;
                let local = LocalFileSystem::new_with_prefix(path)
                    .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
                Self {
                    inner: Arc::new(local),
                    signer: None,
                }
            }

            StoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                let builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                let s3 = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );

                // Verify bucket exists by listing (empty prefix)
                // This will fail fast if the bucket doesn't exist
                {
                    let mut stream = s3.list(None);
                    match stream.try_next().await {
                        Ok(_) => {}
                        Err(object_store::Error::NotFound { .. }) => {
                            return Err(StoreError::BucketNotFound(bucket.clone()));
                        }
                        Err(e) => {
                            let msg = e.to_string();
                            if msg.contains("NoSuchBucket")
                                || msg.contains("bucket") && msg.contains("not")
                            {
                                return Err(StoreError::BucketNotFound(bucket.clone()));
                            }
                            return Err(e.into());
                        }
                    }
                }

                let signer: Arc<dyn Signer> = s3.clone();
                Self {
                    inner: s3,
                    signer: Some(signer),
                }
            }
        };

        tracing::info!(backend = config.kind(), "object storage ready");
        Ok(storage)
    }

    /// Create an in-memory storage backend.
    pub fn memory() -> Self {
        Self::from_object_store(Arc::new(InMemory::new()))
    }

    /// Wrap an existing backend. The result cannot sign URLs.
    pub fn from_object_store(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            signer: None,
        }
    }

    /// Whether this backend can hand out presigned URLs.
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    fn path(key: &str) -> Result<ObjectPath> {
        if key.trim_matches('/').is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        ObjectPath::parse(key).map_err(|_| StoreError::InvalidKey(key.to_string()))
    }

    fn prefix(prefix: &str) -> Result<Option<ObjectPath>> {
        if prefix.trim_matches('/').is_empty() {
            return Ok(None);
        }
        Self::path(prefix).map(Some)
    }

    /// Get an object's body, or `None` if nothing is stored at `key`.
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = Self::path(key)?;
        match self.inner.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                Ok(Some(bytes))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether an object exists at `key`.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = Self::path(key)?;
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the object at `key` with `data`.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = Self::path(key)?;
        tracing::debug!(key = %path, size = data.len(), "put object");
        self.inner.put(&path, data.into()).await?;
        Ok(())
    }

    /// Delete a single object. Missing objects are not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = Self::path(key)?;
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List one level under `prefix`, using `/` as the delimiter.
    pub async fn list(&self, prefix: &str) -> Result<Listing> {
        let prefix = Self::prefix(prefix)?;
        let result = self.inner.list_with_delimiter(prefix.as_ref()).await?;

        let folders = result
            .common_prefixes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let files = result
            .objects
            .into_iter()
            .map(|meta| ObjectEntry {
                key: meta.location.as_ref().to_string(),
                size: meta.size as u64,
                last_modified: meta.last_modified,
            })
            .collect();

        Ok(Listing { folders, files })
    }

    /// Delete every object under `prefix/`, returning the deleted keys in
    /// the order they went.
    ///
    /// Keys matching `metadata` are held back until everything else is gone,
    /// deepest first, so the metadata of the prefix itself is removed last.
    /// A failure part way leaves the remaining metadata in place.
    pub async fn delete_prefix(
        &self,
        prefix: &str,
        metadata: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>> {
        let path = Self::path(prefix)?;
        let items: Vec<_> = self.inner.list(Some(&path)).try_collect().await?;

        let (mut held, payload): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|meta| meta.location)
            .partition(|location| metadata(location.as_ref()));
        held.sort_by_key(|location| std::cmp::Reverse(location.parts().count()));

        let mut deleted = Vec::with_capacity(payload.len() + held.len());
        for location in payload.into_iter().chain(held) {
            match self.inner.delete(&location).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => {
                    tracing::warn!(prefix = %path, deleted = deleted.len(), "prefix delete interrupted");
                    return Err(e.into());
                }
            }
            deleted.push(location.as_ref().to_string());
        }

        tracing::info!(prefix = %path, count = deleted.len(), "deleted prefix");
        Ok(deleted)
    }

    /// Generate a presigned GET URL for `key`.
    pub async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<Url> {
        let signer = self.signer.as_ref().ok_or(StoreError::SigningUnsupported)?;
        let path = Self::path(key)?;
        let url = signer
            .signed_url(http::Method::GET, &path, expires_in)
            .await?;
        Ok(url)
    }
}
