use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::model::store::S3Settings;
use crate::model::{ArtifactStore, LocalArtifactStore, S3ArtifactStore, DEFAULT_MAX_FEATURES};

/// Where the three model artifacts are read from (service) or written to (trainer).
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    Local(PathBuf),
    S3(S3Settings),
}

impl ArtifactSource {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(bucket) = lookup("ARTIFACT_S3_BUCKET").filter(|b| !b.is_empty()) else {
            let dir = lookup("ARTIFACT_DIR").unwrap_or_else(|| "artifacts".to_string());
            return Ok(ArtifactSource::Local(PathBuf::from(dir)));
        };
        Ok(ArtifactSource::S3(S3Settings {
            bucket,
            prefix: lookup("ARTIFACT_S3_PREFIX").unwrap_or_default(),
            endpoint: lookup("S3_ENDPOINT").filter(|e| !e.is_empty()),
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: require(lookup, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: require(lookup, "AWS_SECRET_ACCESS_KEY")?,
        }))
    }

    pub async fn open(&self) -> Arc<dyn ArtifactStore> {
        match self {
            ArtifactSource::Local(dir) => Arc::new(LocalArtifactStore::new(dir)),
            ArtifactSource::S3(settings) => Arc::new(S3ArtifactStore::connect(settings).await),
        }
    }
}

/// Inference service configuration loaded from environment variables.
/// Startup fails if a set variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactSource,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            artifacts: ArtifactSource::from_lookup(&lookup)?,
            request_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Offline training configuration.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub label_column: String,
    pub test_size: f64,
    pub random_seed: u64,
    pub max_features: usize,
    pub artifacts: ArtifactSource,
    pub rust_log: String,
}

impl TrainingConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let test_size: f64 = parse_or(&lookup, "TEST_SIZE", 0.2)?;
        if !(test_size > 0.0 && test_size < 1.0) {
            bail!("TEST_SIZE must be strictly between 0 and 1, got {test_size}");
        }
        let max_features: usize = parse_or(&lookup, "MAX_FEATURES", DEFAULT_MAX_FEATURES)?;
        if max_features == 0 {
            bail!("MAX_FEATURES must be at least 1");
        }
        Ok(TrainingConfig {
            dataset_path: PathBuf::from(
                lookup("DATASET_PATH").unwrap_or_else(|| "resume_dataset.csv".to_string()),
            ),
            label_column: lookup("LABEL_COLUMN").unwrap_or_else(|| "Title".to_string()),
            test_size,
            random_seed: parse_or(&lookup, "RANDOM_SEED", 42)?,
            max_features,
            artifacts: ArtifactSource::from_lookup(&lookup)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_service_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(matches!(config.artifacts, ArtifactSource::Local(ref p) if p == &PathBuf::from("artifacts")));
    }

    #[test]
    fn test_invalid_port_is_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_s3_source_requires_credentials() {
        assert!(Config::from_lookup(lookup(&[("ARTIFACT_S3_BUCKET", "models")])).is_err());

        let config = Config::from_lookup(lookup(&[
            ("ARTIFACT_S3_BUCKET", "models"),
            ("ARTIFACT_S3_PREFIX", "careerlens/v1"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
        ]))
        .unwrap();
        match config.artifacts {
            ArtifactSource::S3(s3) => {
                assert_eq!(s3.bucket, "models");
                assert_eq!(s3.prefix, "careerlens/v1");
                assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
            }
            other => panic!("expected S3 source, got {other:?}"),
        }
    }

    #[test]
    fn test_training_defaults() {
        let config = TrainingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.label_column, "Title");
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.max_features, 5000);
        assert!((config.test_size - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_training_rejects_out_of_range_test_size() {
        assert!(TrainingConfig::from_lookup(lookup(&[("TEST_SIZE", "1.5")])).is_err());
        assert!(TrainingConfig::from_lookup(lookup(&[("TEST_SIZE", "0")])).is_err());
    }
}
