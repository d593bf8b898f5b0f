//! Object storage abstraction
//!
//! The publisher only needs five operations against a bucket; they live
//! behind a trait so tests can substitute an in-memory store. The real
//! backend is S3 (or any S3-compatible service via a custom endpoint).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use shipwright_core::DownloadCenterCredentials;
use std::path::Path;
use tracing::debug;

/// Minimal bucket operations the download center needs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object exists at this key
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetch an object's bytes
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Write an object
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Stream a local file into an object
    async fn put_file(&self, key: &str, path: &Path) -> Result<()>;

    /// Server-side copy within the bucket
    async fn copy(&self, src_key: &str, dest_key: &str) -> Result<()>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        (**self).put(key, data, content_type).await
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        (**self).put_file(key, path).await
    }

    async fn copy(&self, src_key: &str, dest_key: &str) -> Result<()> {
        (**self).copy(src_key, dest_key).await
    }
}

/// Build an S3 client from explicit credentials.
///
/// A custom endpoint switches on path-style addressing, which S3-compatible
/// services require.
pub async fn s3_client(
    credentials: &DownloadCenterCredentials,
    region: &str,
    endpoint: Option<&str>,
) -> Client {
    let provider = Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        None,
        None,
        "download-center",
    );

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(provider)
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint_url) = endpoint {
        debug!("Using custom object store endpoint: {}", endpoint_url);
        builder = builder.endpoint_url(endpoint_url).force_path_style(true);
    }

    Client::from_conf(builder.build())
}

/// S3-backed store scoped to one bucket
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow!(
                        "Failed to check s3://{}/{}: {}",
                        self.bucket,
                        key,
                        service_error
                    ))
                }
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to get s3://{}/{}", self.bucket, key))?;

        let body = resp
            .body
            .collect()
            .await
            .context("Failed to read object body")?;
        Ok(body.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        debug!(
            "Uploading {} bytes to s3://{}/{}",
            data.len(),
            self.bucket,
            key
        );
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("Failed to put s3://{}/{}", self.bucket, key))?;
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        debug!(
            "Uploading {} to s3://{}/{}",
            path.display(),
            self.bucket,
            key
        );
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to put s3://{}/{}", self.bucket, key))?;
        Ok(())
    }

    async fn copy(&self, src_key: &str, dest_key: &str) -> Result<()> {
        debug!(
            "Copying s3://{}/{} -> s3://{}/{}",
            self.bucket, src_key, self.bucket, dest_key
        );
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, src_key))
            .key(dest_key)
            .send()
            .await
            .with_context(|| format!("Failed to copy {} to {}", src_key, dest_key))?;
        Ok(())
    }
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
