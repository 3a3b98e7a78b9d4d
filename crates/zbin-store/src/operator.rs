//! OpenDAL Operator factory for zbin storage backends

use anyhow::{Context, Result};
use opendal::Operator;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use zbin_core::config::{StorageBackend, StorageConfig};

use crate::{DocumentStore, MemoryStore, ObjectStore};

/// S3 access credentials
#[derive(Debug)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl S3Credentials {
    /// Read AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY, falling back to the
    /// ZBIN_-prefixed names.
    pub fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .or_else(|_| std::env::var("ZBIN_ACCESS_KEY_ID"))
            .context("S3 credentials not set: export AWS_ACCESS_KEY_ID")?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .or_else(|_| std::env::var("ZBIN_SECRET_ACCESS_KEY"))
            .context("AWS_SECRET_ACCESS_KEY not set")?;
        Ok(Self {
            access_key_id,
            secret_access_key: SecretString::from(secret_access_key),
        })
    }
}

/// Build an operator for the configured backend.
///
/// `credentials` is only consulted for the S3 backend. If `enforce_tls` is
/// true and the S3 endpoint uses HTTP, this returns an error; otherwise a
/// warning is logged for non-HTTPS endpoints.
pub fn build_operator(cfg: &StorageConfig, credentials: Option<&S3Credentials>) -> Result<Operator> {
    let op = match cfg.backend {
        StorageBackend::Memory => Operator::new(opendal::services::Memory::default())
            .context("creating OpenDAL memory operator")?
            .finish(),
        StorageBackend::Fs => {
            let builder = opendal::services::Fs::default().root(&cfg.root);
            Operator::new(builder)
                .context("creating OpenDAL fs operator")?
                .layer(opendal::layers::LoggingLayer::default())
                .finish()
        }
        StorageBackend::S3 => {
            let creds = credentials.context("S3 backend requires credentials")?;
            check_endpoint_tls(cfg)?;
            // opendal 0.55: S3 builder uses consuming pattern (methods take `self`, return `Self`)
            let builder = opendal::services::S3::default()
                .endpoint(&cfg.endpoint)
                .region(&cfg.region)
                .bucket(&cfg.bucket)
                .root(&cfg.root)
                .access_key_id(&creds.access_key_id)
                .secret_access_key(creds.secret_access_key.expose_secret());

            Operator::new(builder)
                .context("creating OpenDAL S3 operator")?
                .layer(opendal::layers::LoggingLayer::default())
                .layer(
                    opendal::layers::RetryLayer::new()
                        .with_max_times(5)
                        .with_jitter(),
                )
                .finish()
        }
    };
    Ok(op)
}

/// Open the document store the configuration names.
///
/// `memory` is a process-local [`MemoryStore`]; `fs` and `s3` are an
/// [`ObjectStore`] over the matching operator. S3 credentials come from the
/// environment.
pub fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match cfg.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Fs => Arc::new(ObjectStore::new(build_operator(cfg, None)?)),
        StorageBackend::S3 => {
            let creds = S3Credentials::from_env()?;
            Arc::new(ObjectStore::new(build_operator(cfg, Some(&creds))?))
        }
    };
    tracing::debug!(backend = ?cfg.backend, "document store opened");
    Ok(store)
}

fn check_endpoint_tls(cfg: &StorageConfig) -> Result<()> {
    if cfg.endpoint.starts_with("http://") {
        if cfg.enforce_tls {
            anyhow::bail!(
                "S3 endpoint uses plaintext HTTP ({}), but enforce_tls is enabled. \
                 Use an HTTPS endpoint or set storage.enforce_tls = false for local development.",
                cfg.endpoint
            );
        }
        tracing::warn!(
            endpoint = %cfg.endpoint,
            "S3 endpoint uses plaintext HTTP; credentials are transmitted unencrypted. \
             Set storage.enforce_tls = true and use HTTPS in production."
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> S3Credentials {
        S3Credentials {
            access_key_id: "test-key".into(),
            secret_access_key: SecretString::from("test-secret".to_string()),
        }
    }

    fn s3_config(endpoint: &str, enforce_tls: bool) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::S3,
            endpoint: endpoint.into(),
            enforce_tls,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_memory_operator() {
        let op = build_operator(&StorageConfig::default(), None);
        assert!(op.is_ok(), "memory operator construction should succeed");
    }

    #[test]
    fn test_build_fs_operator() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = StorageConfig {
            backend: StorageBackend::Fs,
            root: tmp.path().display().to_string(),
            ..Default::default()
        };
        assert!(build_operator(&cfg, None).is_ok());
    }

    #[tokio::test]
    async fn test_open_fs_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = StorageConfig {
            backend: StorageBackend::Fs,
            root: tmp.path().display().to_string(),
            ..Default::default()
        };
        let store = open_store(&cfg).unwrap();
        store.check_health().await.unwrap();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(&StorageConfig::default()).unwrap();
        store.check_health().await.unwrap();
    }

    #[test]
    fn test_s3_requires_credentials() {
        let result = build_operator(&s3_config("https://s3.example.com", false), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_s3_http_warning() {
        // HTTP endpoint with enforce_tls=false should succeed (but log warning)
        let result = build_operator(&s3_config("http://localhost:9000", false), Some(&creds()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_s3_http_enforce_tls() {
        let result = build_operator(&s3_config("http://insecure:9000", true), Some(&creds()));
        assert!(result.is_err(), "HTTP + enforce_tls must fail");
        assert!(
            result.unwrap_err().to_string().contains("enforce_tls"),
            "error message should mention enforce_tls"
        );
    }

    #[test]
    fn test_s3_https() {
        let result = build_operator(&s3_config("https://s3.example.com", true), Some(&creds()));
        assert!(result.is_ok());
    }
}
