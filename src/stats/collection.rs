//! Aggregation table: key fingerprint to [`Stat`] behind one exclusive lock

use super::stat::{Fingerprint, Stat, StatSnapshot};
use crate::types::DiscardThreshold;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Entry counts around one pruning sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    pub before: usize,
    pub after: usize,
}

impl PruneReport {
    /// Number of keys evicted by the sweep
    #[must_use]
    #[inline]
    pub const fn evicted(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Thread-safe aggregation table
///
/// Every read and write goes through the same mutex. Readers copy what they
/// need while holding it and do all further work (sorting, formatting) on
/// the private copy.
///
/// Two keys with the same fingerprint share one entry. The first key seen
/// keeps the slot; later events for the other key are merged into it and
/// counted in [`collisions`](Self::collisions).
#[derive(Debug, Default)]
pub struct StatCollection {
    entries: Mutex<HashMap<Fingerprint, Stat>>,
    collisions: AtomicU64,
}

impl StatCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event observed now
    pub fn increment(&self, key: &str, size: u32) {
        self.increment_at(key, size, Instant::now());
    }

    /// Record one event observed at `now`
    pub fn increment_at(&self, key: &str, size: u32, now: Instant) {
        let fingerprint = Fingerprint::of(key);
        let mut entries = self.entries.lock();
        match entries.entry(fingerprint) {
            Entry::Occupied(mut occupied) => {
                let stat = occupied.get_mut();
                if stat.key() != key {
                    self.collisions.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        %fingerprint,
                        stored = stat.key(),
                        incoming = key,
                        "Fingerprint collision, merging into existing entry"
                    );
                }
                stat.record(size);
                trace!(key, size, count = stat.count(), "Incremented stat");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Stat::new(key, size, now));
            }
        }
    }

    /// Number of distinct tracked fingerprints
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of events merged into an entry owned by a different key
    #[must_use]
    pub fn collisions(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Copy a single entry out of the table
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Stat> {
        self.entries.lock().get(&Fingerprint::of(key)).cloned()
    }

    /// Copy every entry, with derived metrics evaluated at `now`
    ///
    /// The lock is released before the caller sees the result.
    #[must_use]
    pub fn snapshot_at(&self, now: Instant) -> Vec<StatSnapshot> {
        let entries = self.entries.lock();
        entries.values().map(|stat| stat.snapshot_at(now)).collect()
    }

    /// Remove every entry whose lifetime request rate is below `threshold`
    ///
    /// A disabled threshold leaves the table untouched.
    pub fn prune(&self, threshold: DiscardThreshold, now: Instant) -> PruneReport {
        let mut entries = self.entries.lock();
        let before = entries.len();
        if !threshold.is_disabled() {
            let limit = threshold.get();
            entries.retain(|_, stat| stat.request_rate_at(now) >= limit);
            entries.shrink_to_fit();
        }
        PruneReport {
            before,
            after: entries.len(),
        }
    }

    /// Place `stat` under an arbitrary fingerprint
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, fingerprint: Fingerprint, stat: Stat) {
        self.entries.lock().insert(fingerprint, stat);
    }
}
