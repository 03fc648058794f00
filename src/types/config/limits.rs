//! Capacity and sizing configuration types

use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::types::ValidationError;

nonzero_newtype! {
    /// A non-zero event queue capacity
    ///
    /// The queue between capture and ingestion is the only backpressure
    /// point, so it must be able to hold at least one event.
    ///
    /// # Examples
    /// ```
    /// use mckeys::types::QueueCapacity;
    ///
    /// let cap = QueueCapacity::new(1024).unwrap();
    /// assert_eq!(cap.get(), 1024);
    /// assert!(QueueCapacity::new(0).is_none());
    /// ```
    pub struct QueueCapacity(NonZeroUsize: usize, serialize as serialize_u64);
}

impl QueueCapacity {
    /// Default queue capacity
    pub const DEFAULT: Self =
        Self(NonZeroUsize::new(crate::constants::stats::QUEUE_CAPACITY).unwrap());
}

impl Default for QueueCapacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

nonzero_newtype! {
    /// A non-zero number of leaderboard rows to display
    pub struct RowLimit(NonZeroUsize: usize, serialize as serialize_u64);
}

impl RowLimit {
    /// Default number of rows per refresh
    pub const DEFAULT: Self = Self(NonZeroUsize::new(crate::constants::display::LIMIT).unwrap());
}

impl Default for RowLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for RowLimit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<usize>()
            .map_err(|_| ValidationError::InvalidNumber(s.to_string()))?;
        Self::new(value).ok_or(ValidationError::ZeroRowLimit)
    }
}

nonzero_newtype! {
    /// A non-zero thread count
    ///
    /// Ensures the runtime always has at least 1 worker thread.
    pub struct ThreadCount(NonZeroUsize: usize, serialize as serialize_u64);
}

impl ThreadCount {
    /// Single-threaded runtime
    pub const SINGLE: Self = Self(NonZeroUsize::new(1).unwrap());

    /// Number of available CPU cores, falling back to 1
    #[must_use]
    pub fn from_available_parallelism() -> Self {
        std::thread::available_parallelism()
            .map(Self)
            .unwrap_or(Self::SINGLE)
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl FromStr for ThreadCount {
    type Err = ValidationError;

    /// Parses a thread count, where `0` means one thread per CPU core
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<usize>()
            .map_err(|_| ValidationError::InvalidNumber(s.to_string()))?;
        Ok(Self::new(value).unwrap_or_else(Self::from_available_parallelism))
    }
}
