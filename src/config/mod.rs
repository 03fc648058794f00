//! Configuration module
//!
//! This module handles all configuration types and loading
//! for the key statistics engine and its binary.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{
    ConfigSource, apply_env_overrides, create_default_config, load_config,
    load_config_with_fallback,
};
pub use types::{CaptureConfig, Config, DisplayConfig, StatsConfig};

pub use defaults::{
    backoff_initial, backoff_max, prune_interval, refresh_interval, shutdown_timeout,
};
