use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::quality::{Quality, QualityDefinition, StaticQualityDefinitions};
use crate::search::DEFAULT_PROVIDER_PRIORITY;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
    /// Overrides for the built-in size definitions.
    #[serde(default)]
    pub quality_definitions: Vec<QualityDefinition>,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Built-in definitions with configured entries replacing their defaults.
    pub fn quality_definitions(&self) -> StaticQualityDefinitions {
        use crate::quality::QualityDefinitionLookup;

        let defaults = StaticQualityDefinitions::with_defaults();
        let merged = Quality::ALL.iter().map(|q| {
            self.quality_definitions
                .iter()
                .find(|d| d.quality == *q)
                .copied()
                .unwrap_or_else(|| defaults.get(*q))
        });
        StaticQualityDefinitions::new(merged)
    }
}

/// Search orchestration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Timeout applied to every provider call (default: 30)
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
    /// Maximum providers queried at once per search (default: 4)
    #[serde(default = "default_max_concurrent_providers")]
    pub max_concurrent_providers: usize,
}

impl SearchConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout(),
            max_concurrent_providers: default_max_concurrent_providers(),
        }
    }
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_max_concurrent_providers() -> usize {
    4
}

/// Jackett provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Indexers exposed as individual providers
    #[serde(default)]
    pub indexers: Vec<IndexerConfig>,
}

fn default_timeout() -> u32 {
    30
}

/// A single Jackett indexer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Jackett indexer id (e.g., "1337x")
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lower values are preferred
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Restricts the indexer to library items carrying one of these tags
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub interactive_search: bool,
    #[serde(default = "default_true")]
    pub automatic_search: bool,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    DEFAULT_PROVIDER_PRIORITY
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("quarry.db")
}
