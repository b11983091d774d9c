use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::{DEFAULT_NGRAM_SIZE, DEFAULT_THRESHOLD};
use crate::extract::document::{DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MAX_DOCUMENT_BYTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub version: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database: DatabaseConfig::default(),
            catalog: CatalogConfig::default(),
            extractor: ExtractorConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<String>,
}

impl DatabaseConfig {
    /// Configured path, or `~/.plagiarism/data/reports.db`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(PathBuf::from(path)),
            None => crate::db::default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorConfig {
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT.as_secs()
}

fn default_max_document_bytes() -> u64 {
    DEFAULT_MAX_DOCUMENT_BYTES
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: default_download_timeout_secs(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl ExtractorConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_max_concurrent_comparisons")]
    pub max_concurrent_comparisons: usize,
    /// Overall deadline for one analysis cycle.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_ngram_size() -> usize {
    DEFAULT_NGRAM_SIZE
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_max_concurrent_comparisons() -> usize {
    8
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ngram_size: default_ngram_size(),
            threshold: default_threshold(),
            max_concurrent_comparisons: default_max_concurrent_comparisons(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
