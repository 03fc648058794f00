//! Configuration type definitions
//!
//! This module contains all the configuration structures used by the engine
//! and the binary.

use crate::stats::{Backoff, SortMode, SortOrder};
use crate::types::{
    DiscardThreshold, InterfaceName, Port, QueueCapacity, RowLimit, duration_serde,
    millis_serde,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Statistics engine settings
    #[serde(default)]
    pub stats: StatsConfig,
    /// Capture-layer settings (only read by the capture collaborator)
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Leaderboard display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Statistics engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsConfig {
    /// Minimum lifetime request rate (req/s) to survive pruning; 0 disables pruning
    #[serde(default)]
    pub discard_threshold: DiscardThreshold,
    /// Period between pruning sweeps
    #[serde(with = "duration_serde", default = "super::defaults::prune_interval")]
    pub prune_interval: Duration,
    /// Bounded wait for each background task at shutdown
    #[serde(
        with = "duration_serde",
        default = "super::defaults::shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,
    /// First idle wait after an empty poll
    #[serde(
        rename = "backoff_initial_ms",
        with = "millis_serde",
        default = "super::defaults::backoff_initial"
    )]
    pub backoff_initial: Duration,
    /// Idle wait cap
    #[serde(
        rename = "backoff_max_ms",
        with = "millis_serde",
        default = "super::defaults::backoff_max"
    )]
    pub backoff_max: Duration,
    /// Capacity of the event queue feeding the engine
    #[serde(default)]
    pub queue_capacity: QueueCapacity,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            discard_threshold: DiscardThreshold::DISABLED,
            prune_interval: super::defaults::prune_interval(),
            shutdown_timeout: super::defaults::shutdown_timeout(),
            backoff_initial: super::defaults::backoff_initial(),
            backoff_max: super::defaults::backoff_max(),
            queue_capacity: QueueCapacity::default(),
        }
    }
}

impl StatsConfig {
    /// Fresh idle backoff built from these settings
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.backoff_initial, self.backoff_max)
    }

    #[must_use]
    pub fn with_discard_threshold(mut self, threshold: DiscardThreshold) -> Self {
        self.discard_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval = interval;
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.backoff_initial = initial;
        self.backoff_max = max;
        self
    }
}

/// Capture-layer settings
///
/// The engine never reads these; they are handed to whatever opens the
/// live capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CaptureConfig {
    /// Network interface to capture on
    pub interface: InterfaceName,
    /// Key-value store port to filter on
    pub port: Port,
}

/// Leaderboard display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Rows printed per refresh
    #[serde(default)]
    pub limit: RowLimit,
    /// Period between prints
    #[serde(
        with = "duration_serde",
        default = "super::defaults::refresh_interval"
    )]
    pub refresh: Duration,
    /// Metric the printed leaderboard is ranked by
    #[serde(default)]
    pub sort_mode: SortMode,
    /// Direction of the printed leaderboard
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            limit: RowLimit::default(),
            refresh: super::defaults::refresh_interval(),
            sort_mode: SortMode::default(),
            sort_order: SortOrder::default(),
        }
    }
}
