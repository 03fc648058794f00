//! Engine lifecycle state machine

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the statistics engine: `New -> Running -> Stopping -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EngineState {
    New = 0,
    Running = 1,
    Stopping = 2,
    Terminated = 3,
}

impl EngineState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Terminated => "terminated",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::New,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Terminated,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic cell holding an [`EngineState`]
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(EngineState::New as u8))
    }

    #[must_use]
    #[inline]
    pub fn get(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[must_use]
    #[inline]
    pub fn is_running(&self) -> bool {
        self.get() == EngineState::Running
    }

    /// Move from `from` to `to` only if the current state is `from`
    pub fn check_and_set(&self, from: EngineState, to: EngineState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
