//! Constants used throughout the key statistics engine
//!
//! This module centralizes magic numbers and configuration values
//! to improve maintainability and reduce duplication.

use std::time::Duration;

/// Statistics engine timing
pub mod stats {
    use super::Duration;

    /// Period between two pruning sweeps
    pub const PRUNE_INTERVAL: Duration = Duration::from_secs(5);

    /// Bounded wait for each background loop during shutdown
    ///
    /// A loop that has not observed the stop signal within this window is
    /// reported as a shutdown failure instead of blocking forever.
    pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Smallest elapsed window used when deriving request rates
    ///
    /// Keeps `count / elapsed` finite for entries created in the same
    /// instant they are inspected.
    pub const MIN_RATE_WINDOW: Duration = Duration::from_millis(1);

    /// Capacity of the event queue between capture and ingestion
    pub const QUEUE_CAPACITY: usize = 64 * 1024;
}

/// Idle backoff for the ingestion loop
pub mod backoff {
    use super::Duration;

    /// First wait after an empty poll
    pub const INITIAL: Duration = Duration::from_millis(1);

    /// Upper bound on a single idle wait
    ///
    /// Also bounds how long the ingestion loop can take to notice a
    /// lifecycle change on its own.
    pub const MAX: Duration = Duration::from_millis(250);

    /// Growth factor between consecutive empty polls
    pub const MULTIPLIER: u32 = 2;
}

/// Leaderboard table layout
///
/// Operators script against this layout, keep it stable.
pub mod table {
    /// Width of the key column
    pub const KEY_WIDTH: usize = 110;

    /// Width of every numeric column
    pub const NUM_WIDTH: usize = 10;

    /// Column separator
    pub const SEPARATOR: &str = ", ";

    /// Column headers in output order
    pub const HEADERS: [&str; 6] = ["Key", "Count", "Elapsed", "Rate", "Size", "BW"];
}

/// Display defaults for the binary
pub mod display {
    use super::Duration;

    /// Number of leaderboard rows printed per refresh
    pub const LIMIT: usize = 20;

    /// Period between two leaderboard prints
    pub const REFRESH: Duration = Duration::from_secs(3);
}

/// Capture-side defaults
pub mod capture {
    /// Interface opened when none is configured
    pub const INTERFACE: &str = "eth0";

    /// Default memcached port
    pub const PORT: u16 = 11211;
}

/// Environment variables that override the configuration file
pub mod env {
    /// Overrides `stats.discard_threshold`
    pub const DISCARD_THRESHOLD: &str = "MCKEYS_DISCARD_THRESHOLD";

    /// Overrides `capture.interface`
    pub const INTERFACE: &str = "MCKEYS_INTERFACE";

    /// Overrides `capture.port`
    pub const PORT: &str = "MCKEYS_PORT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_bounds_are_ordered() {
        assert!(backoff::INITIAL <= backoff::MAX);
        assert!(backoff::MULTIPLIER >= 2);
    }

    #[test]
    fn test_table_headers_match_layout() {
        assert_eq!(table::HEADERS.len(), 6);
        assert_eq!(table::HEADERS[0], "Key");
        assert_eq!(table::HEADERS[5], "BW");
    }

    #[test]
    fn test_rate_window_is_positive() {
        assert!(!stats::MIN_RATE_WINDOW.is_zero());
        assert!(!stats::PRUNE_INTERVAL.is_zero());
        assert!(!stats::SHUTDOWN_TIMEOUT.is_zero());
    }
}
