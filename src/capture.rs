//! Event source boundary between capture/parsing and the statistics engine
//!
//! Packet capture and protocol parsing live outside this crate. They hand
//! `(key, size)` pairs to the engine through an [`EventSource`]; the engine
//! only ever asks for one event at a time and never blocks on it.

use crossbeam::queue::ArrayQueue;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One observed key access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub key: String,
    pub size: u32,
}

impl Event {
    #[must_use]
    pub fn new(key: impl Into<String>, size: u32) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Outcome of a single non-blocking consume attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consumed {
    Event(Event),
    /// Nothing queued right now
    Empty,
    /// The producer is gone and nothing else will arrive
    Closed,
}

/// Non-blocking source of events for the ingestion loop
pub trait EventSource: Send + 'static {
    /// Take one event if one is immediately available
    fn try_consume(&mut self) -> Consumed;
}

/// Bounded lock-free queue shared between producers and the engine
///
/// Pushing into a full queue drops the event and counts it; the engine
/// accepts approximate counts under backpressure.
#[derive(Debug, Clone)]
pub struct EventQueue {
    inner: Arc<QueueInner>,
}

#[derive(Debug)]
struct QueueInner {
    queue: ArrayQueue<Event>,
    dropped: AtomicU64,
}

impl EventQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                queue: ArrayQueue::new(capacity.max(1)),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Enqueue an event, returning `false` if it was dropped
    pub fn push(&self, event: Event) -> bool {
        match self.inner.queue.push(event) {
            Ok(()) => true,
            Err(_) => {
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.queue.capacity()
    }

    /// Events discarded because the queue was full
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl EventSource for EventQueue {
    fn try_consume(&mut self) -> Consumed {
        match self.inner.queue.pop() {
            Some(event) => Consumed::Event(event),
            None => Consumed::Empty,
        }
    }
}

impl EventSource for mpsc::Receiver<Event> {
    fn try_consume(&mut self) -> Consumed {
        match self.try_recv() {
            Ok(event) => Consumed::Event(event),
            Err(mpsc::error::TryRecvError::Empty) => Consumed::Empty,
            Err(mpsc::error::TryRecvError::Disconnected) => Consumed::Closed,
        }
    }
}

/// Errors parsing a textual `<key> <size>` event line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("event line is empty")]
    Empty,

    #[error("event line has no size: {0:?}")]
    MissingSize(String),

    #[error("invalid size {size:?} for key {key:?}")]
    InvalidSize { key: String, size: String },
}

/// Parse a `<key> <size>` line, as written by replay files and test feeders
///
/// Keys cannot contain whitespace; trailing fields are ignored.
pub fn parse_event_line(line: &str) -> Result<Event, ParseEventError> {
    let mut fields = line.split_whitespace();
    let key = fields.next().ok_or(ParseEventError::Empty)?;
    let size = fields
        .next()
        .ok_or_else(|| ParseEventError::MissingSize(key.to_string()))?;
    let size = size
        .parse::<u32>()
        .map_err(|_| ParseEventError::InvalidSize {
            key: key.to_string(),
            size: size.to_string(),
        })?;
    Ok(Event::new(key, size))
}

/// Totals from one [`feed_lines`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Lines turned into queued events
    pub queued: u64,
    /// Parsed events discarded because the queue was full
    pub dropped: u64,
    /// Lines that were not valid events
    pub malformed: u64,
}

/// Read `<key> <size>` lines until EOF and push them into `queue`
///
/// Blank lines are skipped; malformed lines are logged and counted.
pub async fn feed_lines<R>(reader: R, queue: &EventQueue) -> io::Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = FeedSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_event_line(&line) {
            Ok(event) => {
                if queue.push(event) {
                    summary.queued += 1;
                } else {
                    summary.dropped += 1;
                }
            }
            Err(e) => {
                summary.malformed += 1;
                debug!(error = %e, "Skipping malformed event line");
            }
        }
    }

    if summary.dropped > 0 {
        warn!(
            dropped = summary.dropped,
            capacity = queue.capacity(),
            "Event queue overflowed, counts are approximate"
        );
    }
    Ok(summary)
}
