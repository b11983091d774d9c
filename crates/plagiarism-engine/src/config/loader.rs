use std::path::Path;

use crate::config::schema::EngineConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/engine-config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: EngineConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    // Non-positive thresholds fall back to the default later; anything above 1 can never match.
    let threshold = config.analysis.threshold;
    if threshold.is_nan() || threshold > 1.0 {
        return Err(ConfigError::Validation {
            message: format!("analysis.threshold must be at most 1.0, got {}", threshold),
        });
    }

    if config.analysis.max_concurrent_comparisons == 0 {
        return Err(ConfigError::Validation {
            message: "analysis.maxConcurrentComparisons must be at least 1".to_string(),
        });
    }

    if let Some(base_url) = &config.catalog.base_url {
        let lower = base_url.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return Err(ConfigError::Validation {
                message: format!("catalog.baseUrl must be an http(s) URL, got '{}'", base_url),
            });
        }
    }

    Ok(())
}
