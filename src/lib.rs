//! Live hot-key statistics for key-value store traffic
//!
//! A capture/parsing layer (outside this crate) turns observed requests into
//! `(key, size)` [`Event`]s. The [`Stats`] engine drains them in the
//! background, keeps per-key call counts, sizes, request rates and bandwidth,
//! evicts keys whose rate decays below a threshold, and serves ranked
//! leaderboards on demand.
//!
//! ```no_run
//! use mckeys::{Event, EventQueue, SortMode, SortOrder, Stats, StatsConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let queue = EventQueue::new(1024);
//! let stats = Stats::new(StatsConfig::default(), queue.clone());
//! stats.start();
//!
//! queue.push(Event::new("user:42", 512));
//!
//! for leader in stats.get_leaders(SortMode::Calls, SortOrder::Desc) {
//!     println!("{} {}", leader.key, leader.count);
//! }
//! stats.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod capture;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod runtime;
pub mod stats;
pub mod types;

pub use capture::{Consumed, Event, EventQueue, EventSource, feed_lines, parse_event_line};
pub use config::{
    CaptureConfig, Config, ConfigSource, DisplayConfig, StatsConfig, create_default_config,
    load_config, load_config_with_fallback,
};
pub use error::{ShutdownError, Task};
pub use stats::{
    Backoff, EngineState, PruneReport, SortMode, SortOrder, Stat, StatCollection, StatSnapshot,
    Stats,
};
