//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the file so container
//! deployments can tune the engine without editing it.

use anyhow::{Context, Result};
use std::path::Path;

use super::types::Config;
use crate::constants::env;

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from a TOML file
    File(String),
    /// File missing, built-in defaults used
    Defaults,
}

impl ConfigSource {
    /// Human-readable description for logging
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("file '{}'", path),
            Self::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Apply `MCKEYS_*` environment overrides on top of `config`
///
/// Set but unparsable variables are an error rather than silently ignored.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(value) = std::env::var(env::DISCARD_THRESHOLD) {
        config.stats.discard_threshold = value
            .parse()
            .with_context(|| format!("Invalid {}='{}'", env::DISCARD_THRESHOLD, value))?;
        tracing::info!(
            threshold = %config.stats.discard_threshold,
            "Discard threshold overridden from environment"
        );
    }

    if let Ok(value) = std::env::var(env::INTERFACE) {
        config.capture.interface = value
            .parse()
            .with_context(|| format!("Invalid {}='{}'", env::INTERFACE, value))?;
    }

    if let Ok(value) = std::env::var(env::PORT) {
        config.capture.port = value
            .parse()
            .with_context(|| format!("Invalid {}='{}'", env::PORT, value))?;
    }

    Ok(())
}

/// Load configuration from a TOML file, with environment variable overrides
pub fn load_config(config_path: &str) -> Result<Config> {
    let config_content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file '{}'", config_path))?;

    let mut config: Config = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file '{}'", config_path))?;

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Load the file if it exists, otherwise fall back to defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_with_fallback(config_path: &str) -> Result<(Config, ConfigSource)> {
    if Path::new(config_path).exists() {
        let config = load_config(config_path)?;
        return Ok((config, ConfigSource::File(config_path.to_string())));
    }

    tracing::warn!(
        "Config file '{}' not found, using built-in defaults",
        config_path
    );
    let mut config = create_default_config();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok((config, ConfigSource::Defaults))
}

/// Create a default configuration for examples/testing
#[must_use]
pub fn create_default_config() -> Config {
    Config::default()
}
