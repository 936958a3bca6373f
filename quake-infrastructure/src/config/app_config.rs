use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use quake_domain::{EnrichmentFailurePolicy, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub dev_endpoint: String,
    pub use_dev_server: bool,
    pub page_limit: u64,
    pub request_timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub enrich_concurrency: usize,
    /// "sentinel" keeps going when one event's enrichment fails;
    /// "abort" fails the whole export.
    pub enrichment_failure: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://earthquake.usgs.gov/fdsnws/event/1".to_string(),
            dev_endpoint: "https://dev01-earthquake.cr.usgs.gov/fdsnws/event/1".to_string(),
            use_dev_server: false,
            page_limit: 20_000,
            request_timeout_seconds: 30,
            retry_attempts: 3,
            retry_backoff_ms: 500,
            enrich_concurrency: 8,
            enrichment_failure: "sentinel".to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("QUAKECAT_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            if env::var("QUAKECAT_CONFIG").is_ok() {
                return Err(anyhow!("config file not found: {}", path));
            }
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        self.dev_endpoint = self.dev_endpoint.trim().trim_end_matches('/').to_string();
        self.enrichment_failure = self.enrichment_failure.trim().to_lowercase();
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow!("endpoint must not be empty"));
        }
        if self.use_dev_server && self.dev_endpoint.is_empty() {
            return Err(anyhow!("use_dev_server is set but dev_endpoint is empty"));
        }
        if self.page_limit == 0 {
            return Err(anyhow!("page_limit must be greater than 0"));
        }
        if self.retry_attempts == 0 {
            return Err(anyhow!("retry_attempts must be greater than 0"));
        }
        if self.enrich_concurrency == 0 {
            return Err(anyhow!("enrich_concurrency must be greater than 0"));
        }
        if !matches!(self.enrichment_failure.as_str(), "sentinel" | "abort") {
            return Err(anyhow!(
                "enrichment_failure must be \"sentinel\" or \"abort\", got {:?}",
                self.enrichment_failure
            ));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        let endpoint = if self.use_dev_server {
            warn!("using development catalog server {}", self.dev_endpoint);
            self.dev_endpoint.clone()
        } else {
            self.endpoint.clone()
        };
        RuntimeConfig {
            endpoint,
            page_limit: self.page_limit,
            request_timeout_seconds: self.request_timeout_seconds,
            retry_attempts: self.retry_attempts,
            retry_backoff_ms: self.retry_backoff_ms,
            enrich_concurrency: self.enrich_concurrency,
            enrichment_failure: match self.enrichment_failure.as_str() {
                "abort" => EnrichmentFailurePolicy::Abort,
                _ => EnrichmentFailurePolicy::FillSentinel,
            },
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("QUAKECAT_ENDPOINT") {
            self.endpoint = value;
        }
        if let Ok(value) = env::var("QUAKECAT_DEV_ENDPOINT") {
            self.dev_endpoint = value;
        }
        if let Ok(value) = env::var("QUAKECAT_USE_DEV_SERVER") {
            self.use_dev_server = value.parse().unwrap_or(self.use_dev_server);
        }
        if let Ok(value) = env::var("QUAKECAT_PAGE_LIMIT") {
            self.page_limit = value.parse().unwrap_or(self.page_limit);
        }
        if let Ok(value) = env::var("QUAKECAT_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("QUAKECAT_RETRY_ATTEMPTS") {
            self.retry_attempts = value.parse().unwrap_or(self.retry_attempts);
        }
        if let Ok(value) = env::var("QUAKECAT_RETRY_BACKOFF_MS") {
            self.retry_backoff_ms = value.parse().unwrap_or(self.retry_backoff_ms);
        }
        if let Ok(value) = env::var("QUAKECAT_ENRICH_CONCURRENCY") {
            self.enrich_concurrency = value.parse().unwrap_or(self.enrich_concurrency);
        }
        if let Ok(value) = env::var("QUAKECAT_ENRICHMENT_FAILURE") {
            self.enrichment_failure = value;
        }
    }
}
