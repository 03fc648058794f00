//! Per-key metric record and its frozen snapshot

use crate::constants::stats::MIN_RATE_WINDOW;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use xxhash_rust::xxh3::xxh3_64;

/// Fast non-cryptographic hash of a key, used as the table index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a key string
    #[must_use]
    #[inline]
    pub fn of(key: &str) -> Self {
        Self(xxh3_64(key.as_bytes()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Mutable aggregate for one key
///
/// `count` is at least 1 for any entry in a collection and `first_seen` is
/// set once at creation. Rates are lifetime averages, not windowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    key: String,
    size: u32,
    count: u64,
    first_seen: Instant,
}

impl Stat {
    /// Record the first event for a key
    #[must_use]
    pub fn new(key: impl Into<String>, size: u32, now: Instant) -> Self {
        Self {
            key: key.into(),
            size,
            count: 1,
            first_seen: now,
        }
    }

    /// Apply a follow-up event: last size wins, count grows by one
    #[inline]
    pub fn record(&mut self, size: u32) {
        self.size = size;
        self.count = self.count.saturating_add(1);
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    #[inline]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    #[inline]
    pub const fn first_seen(&self) -> Instant {
        self.first_seen
    }

    /// Time since the key was first observed
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.first_seen)
    }

    /// Lifetime-average requests per second
    ///
    /// The elapsed window never drops below [`MIN_RATE_WINDOW`].
    #[must_use]
    pub fn request_rate_at(&self, now: Instant) -> f64 {
        let window = self.elapsed_at(now).max(MIN_RATE_WINDOW);
        self.count as f64 / window.as_secs_f64()
    }

    /// Last observed size times request rate (bytes/sec proxy)
    #[must_use]
    pub fn bandwidth_at(&self, now: Instant) -> f64 {
        f64::from(self.size) * self.request_rate_at(now)
    }

    /// Freeze this record and its derived metrics at `now`
    #[must_use]
    pub fn snapshot_at(&self, now: Instant) -> StatSnapshot {
        StatSnapshot {
            key: self.key.clone(),
            count: self.count,
            size: self.size,
            elapsed: self.elapsed_at(now),
            request_rate: self.request_rate_at(now),
            bandwidth: self.bandwidth_at(now),
        }
    }
}

/// Independent copy of a [`Stat`] with derived metrics evaluated once
///
/// Leaderboards hand these out so callers never observe the live table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatSnapshot {
    pub key: String,
    pub count: u64,
    pub size: u32,
    pub elapsed: Duration,
    pub request_rate: f64,
    pub bandwidth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(Fingerprint::of("foo"), Fingerprint::of("foo"));
        assert_ne!(Fingerprint::of("foo"), Fingerprint::of("bar"));
        assert_eq!(Fingerprint::of("foo").to_string().len(), 16);
    }

    #[test]
    fn test_new_stat_counts_one() {
        let now = Instant::now();
        let stat = Stat::new("foo", 10, now);
        assert_eq!(stat.key(), "foo");
        assert_eq!(stat.count(), 1);
        assert_eq!(stat.size(), 10);
        assert_eq!(stat.first_seen(), now);
    }

    #[test]
    fn test_record_overwrites_size() {
        let mut stat = Stat::new("foo", 10, Instant::now());
        stat.record(20);
        stat.record(5);
        assert_eq!(stat.count(), 3);
        assert_eq!(stat.size(), 5);
    }

    #[test]
    fn test_request_rate_over_lifetime() {
        let start = Instant::now();
        let mut stat = Stat::new("foo", 100, start);
        for _ in 0..9 {
            stat.record(100);
        }
        let later = start + Duration::from_secs(5);
        assert!((stat.request_rate_at(later) - 2.0).abs() < 1e-9);
        assert!((stat.bandwidth_at(later) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_request_rate_clamps_zero_elapsed() {
        let now = Instant::now();
        let stat = Stat::new("foo", 1, now);
        let rate = stat.request_rate_at(now);
        assert!(rate.is_finite());
        assert!((rate - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_rate_decays_without_traffic() {
        let start = Instant::now();
        let stat = Stat::new("foo", 1, start);
        let soon = stat.request_rate_at(start + Duration::from_secs(1));
        let later = stat.request_rate_at(start + Duration::from_secs(100));
        assert!(later < soon);
        assert!((later - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_before_first_seen_is_zero() {
        let now = Instant::now();
        let stat = Stat::new("foo", 1, now + Duration::from_secs(1));
        assert_eq!(stat.elapsed_at(now), Duration::ZERO);
    }

    #[test]
    fn test_snapshot_freezes_metrics() {
        let start = Instant::now();
        let stat = Stat::new("foo", 8, start);
        let at = start + Duration::from_secs(2);
        let snap = stat.snapshot_at(at);
        assert_eq!(snap.key, "foo");
        assert_eq!(snap.count, 1);
        assert_eq!(snap.size, 8);
        assert_eq!(snap.elapsed, Duration::from_secs(2));
        assert!((snap.request_rate - 0.5).abs() < 1e-9);
        assert!((snap.bandwidth - 4.0).abs() < 1e-9);
    }
}
