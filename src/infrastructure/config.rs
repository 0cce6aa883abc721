//! Application configuration
//!
//! One JSON file, nested sections with full `Default` coverage. Missing file
//! means "write the defaults and use them" so a fresh checkout runs without
//! setup.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::site;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "crawler_config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawling: CrawlingConfig,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
}

/// Crawl pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlingConfig {
    /// Seed URL for taxonomy discovery.
    pub seed_url: String,
    /// Delay between listing page fetches, in milliseconds.
    pub page_delay_ms: u64,
    /// Detail enrichment attempts during the primary crawl.
    pub detail_retry_count: u32,
    /// Detail enrichment attempts during recovery (the original run already
    /// failed once, so fewer).
    pub recovery_detail_retry_count: u32,
    /// Backoff between detail attempts, in milliseconds.
    pub detail_retry_delay_ms: u64,
    /// Whether to visit detail pages at all. Off yields summary-only records.
    pub fetch_details: bool,
    /// Upper end of the dense t_number range the gap detector audits against.
    pub expected_max_t_number: u32,
    /// Similarity cutoff for fuzzy category-name matching.
    pub fuzzy_match_cutoff: f64,
    /// Directory for first-page-empty debug dumps. Empty disables dumps.
    pub debug_dump_dir: String,
    pub categories_path: String,
    pub products_path: String,
    pub recovered_path: String,
    pub merged_path: String,
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            seed_url: site::default_seed_url(),
            page_delay_ms: 1000,
            detail_retry_count: 3,
            recovery_detail_retry_count: 2,
            detail_retry_delay_ms: 1000,
            fetch_details: true,
            expected_max_t_number: 879,
            fuzzy_match_cutoff: 0.72,
            debug_dump_dir: "debug".to_string(),
            categories_path: "categories.json".to_string(),
            products_path: "products.json".to_string(),
            recovered_path: "products_recovered.json".to_string(),
            merged_path: "products_complete.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "oliveyoung_crawler=debug".
    pub level: String,
    /// Also write logs to `log_dir` via a non-blocking file appender.
    pub file_logging: bool,
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, creating the file with defaults when absent.
    pub async fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            let config = Self::default();
            config.save(path).await?;
            info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed config file: {}", path.display()))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}
