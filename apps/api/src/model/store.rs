//! Where artifact blobs live. The model layer only sees named byte blobs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("S3 error on s3://{bucket}/{key}: {message}")]
    S3 {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Named blob storage for model artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn load(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    async fn save(&self, name: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Artifacts as files under one directory.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn load(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(name);
        debug!("Reading artifact {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    async fn save(&self, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;

        // Write-then-rename so a reader never sees a half-written file.
        let path = self.root.join(name);
        let tmp = self.root.join(format!(".{name}.tmp"));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Wrote artifact {}", path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

/// Connection settings for S3 or a MinIO endpoint.
#[derive(Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub prefix: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Artifacts as objects under `prefix/` in one bucket.
#[derive(Clone)]
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3ArtifactStore {
    pub async fn connect(settings: &S3Settings) -> Self {
        let client = build_s3_client(settings).await;
        info!("S3 client initialized");
        Self {
            client,
            bucket: settings.bucket.clone(),
            prefix: settings.prefix.trim_matches('/').to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        object_key(&self.prefix, name)
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn load(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let key = self.key(name);
        let s3_error = |message: String| StoreError::S3 {
            bucket: self.bucket.clone(),
            key: key.clone(),
            message,
        };

        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| s3_error(e.to_string()))?;
        let body = object
            .body
            .collect()
            .await
            .map_err(|e| s3_error(e.to_string()))?;

        debug!("Downloaded s3://{}/{}", self.bucket, key);
        Ok(body.into_bytes().to_vec())
    }

    async fn save(&self, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let key = self.key(name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| StoreError::S3 {
                bucket: self.bucket.clone(),
                key: key.clone(),
                message: e.to_string(),
            })?;

        info!("Uploaded artifact to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

fn object_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(settings: &S3Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.access_key_id,
        &settings.secret_access_key,
        None,
        None,
        "careerlens-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials);
    if let Some(endpoint) = &settings.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    // MinIO only serves path-style URLs.
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(settings.endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
