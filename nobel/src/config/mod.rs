//! Service configuration
//!
//! Loaded from a TOML file; every section and key is optional. The engine
//! URL can also be set with `ELASTICSEARCH_URL`, which wins over the file.

use crate::error::{Error, Result};
use nobel_es::ClientOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `elasticsearch.url`
pub const ELASTICSEARCH_URL_ENV: &str = "ELASTICSEARCH_URL";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Maximum request body size in bytes (default: 10MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors: CorsConfig::default(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Cross-origin access; off unless origins are configured
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Allowed origins. `"*"` allows any origin.
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElasticsearchConfig {
    #[serde(default = "default_es_url")]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    /// Attempts made to reach the engine at startup
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    /// Pause between startup attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_es_url() -> String {
    "http://elasticsearch:9200".to_string()
}

fn default_index() -> String {
    "nobel_prizes".to_string()
}

fn default_connect_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: default_es_url(),
            index: default_index(),
            connect_retries: default_connect_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ElasticsearchConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_retries: self.connect_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// One-shot index setup performed before serving
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    /// Drop and recreate the index with the prize mapping
    #[serde(default)]
    pub recreate_index: bool,
    /// Fetch the public prize feed and bulk-load it
    #[serde(default)]
    pub load_data: bool,
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Documents per bulk request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_source_url() -> String {
    "https://api.nobelprize.org/v1/prize.json".to_string()
}

fn default_chunk_size() -> usize {
    100
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            recreate_index: false,
            load_data: false,
            source_url: default_source_url(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl BootstrapConfig {
    pub fn is_enabled(&self) -> bool {
        self.recreate_index || self.load_data
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// `pretty` or `json`; `LOG_FORMAT` takes precedence
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Serve Prometheus text exposition at `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info,nobel=debug".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            metrics_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Read `config_path`, writing a default file first if it is missing
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            if let Err(e) = config.save(config_path) {
                tracing::warn!(path = %config_path.display(), error = %e, "Could not write default config");
            }
            config
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides, reading variables through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ELASTICSEARCH_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.elasticsearch.url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.elasticsearch.index.trim().is_empty() {
            return Err(Error::Config("elasticsearch.index must not be empty".into()));
        }
        if self.elasticsearch.connect_retries == 0 {
            return Err(Error::Config(
                "elasticsearch.connect_retries must be at least 1".into(),
            ));
        }
        if self.bootstrap.chunk_size == 0 {
            return Err(Error::Config("bootstrap.chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}
