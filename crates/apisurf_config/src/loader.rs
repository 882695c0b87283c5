//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::collections::HashSet;
use std::path::Path;

/// The configuration file name looked up in a project directory.
pub const CONFIG_FILE: &str = "apisurf.toml";

/// Loads and validates an `apisurf.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `apisurf.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and header names are unique.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.sdk.name.trim().is_empty() {
        return Err(ConfigError::MissingField("sdk.name".to_string()));
    }
    if config.sdk.cache.trim().is_empty() {
        return Err(ConfigError::MissingField("sdk.cache".to_string()));
    }
    if config.sdk.headers.is_empty() {
        return Err(ConfigError::ValidationError(
            "sdk.headers must list at least one header".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for header in &config.sdk.headers {
        if header.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sdk.headers contains an empty name".to_string(),
            ));
        }
        if !seen.insert(header.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate header '{header}'"
            )));
        }
    }
    Ok(())
}
