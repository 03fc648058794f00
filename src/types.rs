//! Validated configuration and domain value types

pub mod config;
pub mod validated;

pub use config::{
    Port, QueueCapacity, RowLimit, ThreadCount, duration_serde, millis_serde,
};
pub use validated::{DiscardThreshold, InterfaceName, ValidationError};
