//! Idle backoff for the ingestion loop

use crate::constants::backoff::{INITIAL, MAX, MULTIPLIER};
use std::time::Duration;

/// Exponential backoff between empty polls
///
/// Each call to [`next_backoff`](Self::next_backoff) after an empty poll
/// returns a wait no shorter than the previous one, capped at `max`.
/// [`reset`](Self::reset) goes back to the floor as soon as a poll
/// succeeds. Pure arithmetic: no allocation, no blocking.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl Backoff {
    /// Create a backoff growing from `initial` to `max`
    ///
    /// `initial` is raised to [`INITIAL`] so the wait always grows, and
    /// `max` is raised to `initial` when given a smaller value.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(INITIAL);
        let max = max.max(initial);
        Self {
            initial,
            max,
            next: initial,
        }
    }

    /// Wait to apply after an empty poll
    pub fn next_backoff(&mut self) -> Duration {
        let wait = self.next;
        self.next = self
            .next
            .saturating_mul(MULTIPLIER)
            .clamp(self.initial, self.max);
        wait
    }

    /// Return to the floor after a successful poll
    #[inline]
    pub fn reset(&mut self) {
        self.next = self.initial;
    }

    /// Wait the next empty poll would get
    #[must_use]
    #[inline]
    pub const fn current(&self) -> Duration {
        self.next
    }

    #[must_use]
    #[inline]
    pub const fn max(&self) -> Duration {
        self.max
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL, MAX)
    }
}
