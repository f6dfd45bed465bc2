//! Object-storage seam for uploaded media.
//!
//! The upload handler only sees the [`ObjectStorage`] trait; the backend is
//! either the real S3-compatible store or a local directory served by the
//! web server (development and tests).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;

/// Cache directive attached to every uploaded object. Keys are unique per
/// upload, so objects are immutable once written.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write-only object storage with public-read semantics.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `name` (already unique, extension included) with
    /// public-read access and a long-lived cache directive.
    async fn put(&self, name: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), StorageError>;

    /// Public URL for a stored object, preferring the configured CDN domain.
    fn public_url(&self, name: &str) -> String;
}

/// S3-compatible backend (AWS or any store with a custom endpoint).
pub struct S3ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
    endpoint: String,
    key_prefix: String,
    cdn_domain: String,
}

impl S3ObjectStorage {
    pub async fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        use aws_config::{BehaviorVersion, Region};

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.s3.region.clone()));

        // Explicit credentials win over the ambient AWS chain.
        if !config.s3.access_key.is_empty() {
            let credentials = aws_sdk_s3::config::Credentials::new(
                config.s3.access_key.clone(),
                config.s3.secret_key.clone(),
                None,
                None,
                "marlin-config",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if !config.s3.endpoint.is_empty() {
            builder = builder
                .endpoint_url(config.s3.endpoint.clone())
                .force_path_style(true);
        }

        let client = aws_sdk_s3::Client::from_conf(builder.build());

        info!(
            "S3 storage initialized (bucket: {}, region: {})",
            config.s3.bucket, config.s3.region
        );

        Ok(Self {
            client,
            bucket: config.s3.bucket.clone(),
            region: config.s3.region.clone(),
            endpoint: config.s3.endpoint.clone(),
            key_prefix: config.key_prefix.clone(),
            cdn_domain: config.cdn_domain.clone(),
        })
    }

    fn object_key(&self, name: &str) -> String {
        if self.key_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.key_prefix)
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let key = self.object_key(name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .acl(ObjectCannedAcl::PublicRead)
            .cache_control(CACHE_CONTROL)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        info!("Uploaded object to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        let key = self.object_key(name);

        if !self.cdn_domain.is_empty() {
            return format!("https://{}/{key}", self.cdn_domain);
        }

        if self.endpoint.is_empty() {
            format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region)
        } else {
            format!("{}/{}/{key}", self.endpoint.trim_end_matches('/'), self.bucket)
        }
    }
}

/// Local-filesystem backend. Files land in a directory the router serves
/// under `/uploads`.
pub struct LocalObjectStorage {
    root: PathBuf,
    cdn_domain: String,
}

impl LocalObjectStorage {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.local_path),
            cdn_domain: config.cdn_domain.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await?;

        info!("Stored upload at {}", path.display());
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        if self.cdn_domain.is_empty() {
            format!("/uploads/{name}")
        } else {
            format!("https://{}/uploads/{name}", self.cdn_domain)
        }
    }
}
