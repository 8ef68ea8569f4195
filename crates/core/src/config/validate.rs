use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Search timeout and concurrency are not 0
/// - Jackett URL is http(s) and indexer names are unique
/// - Quality definitions are not negative, have max >= min, and appear once
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.search.provider_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.provider_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.max_concurrent_providers == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_concurrent_providers cannot be 0".to_string(),
        ));
    }

    if let Some(jackett) = &config.jackett {
        if !jackett.url.starts_with("http://") && !jackett.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "jackett.url must be an http(s) URL, got '{}'",
                jackett.url
            )));
        }

        let mut names = HashSet::new();
        for indexer in &jackett.indexers {
            if indexer.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "jackett.indexers entries need a name".to_string(),
                ));
            }
            if !names.insert(indexer.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate jackett indexer '{}'",
                    indexer.name
                )));
            }
        }
    }

    let mut qualities = HashSet::new();
    for definition in &config.quality_definitions {
        if !qualities.insert(definition.quality) {
            return Err(ConfigError::ValidationError(format!(
                "quality definition for {} appears more than once",
                definition.quality
            )));
        }
        if definition.min_size_per_minute < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "minimum size for {} cannot be negative",
                definition.quality
            )));
        }
        if let Some(max) = definition.max_size_per_minute {
            if max < definition.min_size_per_minute {
                return Err(ConfigError::ValidationError(format!(
                    "maximum size for {} is below its minimum",
                    definition.quality
                )));
            }
        }
    }

    Ok(())
}
