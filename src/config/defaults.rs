//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use crate::constants;
use std::time::Duration;

/// Default period between pruning sweeps (5 seconds)
#[inline]
pub fn prune_interval() -> Duration {
    constants::stats::PRUNE_INTERVAL
}

/// Default bounded wait per background task at shutdown
#[inline]
pub fn shutdown_timeout() -> Duration {
    constants::stats::SHUTDOWN_TIMEOUT
}

/// Default first idle backoff
#[inline]
pub fn backoff_initial() -> Duration {
    constants::backoff::INITIAL
}

/// Default idle backoff cap
#[inline]
pub fn backoff_max() -> Duration {
    constants::backoff::MAX
}

/// Default leaderboard refresh period
#[inline]
pub fn refresh_interval() -> Duration {
    constants::display::REFRESH
}
