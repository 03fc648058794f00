//! Configuration validation
//!
//! Value-level invariants (non-negative threshold, non-zero capacities,
//! non-empty interface) are enforced by the types themselves. This checks
//! the remaining cross-field constraints before the engine starts.

use anyhow::{Result, bail};
use std::time::Duration;

use super::types::{Config, StatsConfig};

/// Below this, the ingestion loop would spin instead of backing off
const MIN_BACKOFF: Duration = Duration::from_millis(1);

impl Config {
    /// Validate configuration for correctness
    pub fn validate(&self) -> Result<()> {
        validate_stats(&self.stats)?;

        if self.display.refresh.is_zero() {
            bail!("display.refresh must be at least 1 second");
        }

        Ok(())
    }
}

fn validate_stats(stats: &StatsConfig) -> Result<()> {
    if stats.prune_interval.is_zero() {
        bail!("stats.prune_interval must be at least 1 second");
    }
    if stats.shutdown_timeout.is_zero() {
        bail!("stats.shutdown_timeout must be at least 1 second");
    }
    if stats.backoff_initial < MIN_BACKOFF {
        bail!("stats.backoff_initial_ms must be at least 1");
    }
    if stats.backoff_max < stats.backoff_initial {
        bail!(
            "stats.backoff_max_ms ({:?}) must not be below stats.backoff_initial_ms ({:?})",
            stats.backoff_max,
            stats.backoff_initial
        );
    }

    if stats.discard_threshold.is_disabled() {
        tracing::info!("Discard threshold is 0, pruning disabled");
    } else if stats.backoff_max > stats.prune_interval {
        tracing::warn!(
            "stats.backoff_max_ms ({:?}) exceeds the prune interval ({:?}); \
             the ingestion loop may react slowly after idle periods",
            stats.backoff_max,
            stats.prune_interval
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_prune_interval_rejected() {
        let mut config = Config::default();
        config.stats.prune_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_shutdown_timeout_rejected() {
        let mut config = Config::default();
        config.stats.shutdown_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_backoff_rejected() {
        let mut config = Config::default();
        config.stats.backoff_initial = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_backoff_rejected() {
        let mut config = Config::default();
        config.stats.backoff_initial = Duration::from_millis(100);
        config.stats.backoff_max = Duration::from_millis(10);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backoff_max_ms"));
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let mut config = Config::default();
        config.display.refresh = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
