use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ZbinError, ZbinResult};

/// Where the binaries look for zbin.toml unless `--config`/`ZBIN_CONFIG` says otherwise
pub const DEFAULT_CONFIG_PATH: &str = "/etc/zbin/zbin.toml";

/// Top-level configuration (loaded from zbin.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZbinConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub purge: PurgeConfig,
    pub cipher: CipherConfig,
    pub link: LinkConfig,
}

impl ZbinConfig {
    /// Load `path`, or fall back to defaults if the file does not exist.
    ///
    /// Callers report the fallback themselves, once logging is set up.
    pub fn load(path: &Path) -> ZbinResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ZbinError::Config(format!("parsing {}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address (default: 127.0.0.1:8080)
    pub listen: String,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart
    Memory,
    /// Local filesystem under `root`
    Fs,
    /// Any S3-compatible endpoint
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Filesystem root for `fs`, key prefix for `s3`
    pub root: String,
    /// S3 endpoint
    pub endpoint: String,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Enforce HTTPS for S3 connections (warn/error on HTTP endpoints)
    pub enforce_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Seconds between scheduled purges; 0 disables the schedule
    pub interval_secs: u64,
    /// Documents deleted per batch round
    pub page_size: usize,
    /// Overall budget for one purge run
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Raw key length in bytes: 16 or 32
    pub key_size: usize,
    /// IV length in bytes: 12..=16
    pub iv_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Prefix for share links: `<base_url>/<id>#<key>`
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".into(),
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            root: "zbin".into(),
            endpoint: "http://localhost:9000".into(),
            region: "us-east-1".into(),
            bucket: "zbin".into(),
            enforce_tls: false,
        }
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            page_size: 100,
            timeout_secs: None,
        }
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            key_size: 16,
            iv_size: 16,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
        }
    }
}
