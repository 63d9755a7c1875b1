//! S3-compatible object store (AWS, MinIO, …) via `object_store`.
//!
//! The pipeline is synchronous; this store owns a private current-thread
//! Tokio runtime and blocks on each request.

use super::{join_key, Presence, Store};
use crate::error::{BookletError, Result};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::debug;

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    /// Key prefix inside the bucket, e.g. `carnet_partitions`.
    pub prefix: String,
    /// Endpoint URL, e.g. `https://minio.example.org`.
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
}

impl S3Settings {
    /// Read credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`,
    /// `AWS_SESSION_TOKEN` (optional) and `AWS_REGION` (default `us-east-1`).
    pub fn from_env(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        Self::from_lookup(bucket, prefix, endpoint, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        endpoint: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                BookletError::unavailable("object store", format!("{name} is not set"))
            })
        };
        Ok(Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            endpoint: endpoint.into(),
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            session_token: var("AWS_SESSION_TOKEN"),
            region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

/// [`Store`] over any [`ObjectStore`]; keys are joined under `prefix`.
pub struct S3Store {
    client: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    /// Build an `AmazonS3` client from `settings`.
    pub fn connect(settings: S3Settings) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&settings.bucket)
            .with_endpoint(&settings.endpoint)
            .with_region(&settings.region)
            .with_access_key_id(&settings.access_key_id)
            .with_secret_access_key(&settings.secret_access_key)
            .with_allow_http(settings.endpoint.starts_with("http://"))
            .with_virtual_hosted_style_request(false);
        if let Some(token) = &settings.session_token {
            builder = builder.with_token(token);
        }
        let client = builder
            .build()
            .map_err(|e| BookletError::unavailable(&settings.endpoint, e))?;

        debug!(
            "Connected to bucket '{}' at {}",
            settings.bucket, settings.endpoint
        );
        Self::with_object_store(Arc::new(client), settings.bucket, settings.prefix)
    }

    /// Wrap an existing client. `bucket` is only used in [`Store::describe`].
    pub fn with_object_store(
        client: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BookletError::Internal(format!("Failed to create tokio runtime: {e}")))?;

        Ok(Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            runtime,
        })
    }

    fn object_path(&self, key: &str) -> ObjectPath {
        ObjectPath::from(join_key(&self.prefix, key))
    }
}

impl Store for S3Store {
    fn probe(&self, key: &str) -> Result<Presence> {
        let path = self.object_path(key);
        match self.runtime.block_on(self.client.head(&path)) {
            Ok(_) => Ok(Presence::Found),
            Err(object_store::Error::NotFound { .. }) => Ok(Presence::Missing),
            Err(e) => Err(BookletError::unavailable(self.describe(key), e)),
        }
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key);
        let bytes = self
            .runtime
            .block_on(async { self.client.get(&path).await?.bytes().await })
            .map_err(|e| BookletError::unavailable(self.describe(key), e))?;
        Ok(bytes.to_vec())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(key);
        self.runtime
            .block_on(self.client.put(&path, PutPayload::from(bytes.to_vec())))
            .map_err(|e| BookletError::OutputWriteFailed {
                key: self.describe(key),
                detail: e.to_string(),
            })?;
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, join_key(&self.prefix, key))
    }
}
