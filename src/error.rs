//! Error types for the statistics engine

use std::time::Duration;
use thiserror::Error;

/// Background loop owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Ingest,
    Prune,
}

impl Task {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Prune => "prune",
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A background loop did not stop cleanly
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShutdownError {
    /// The loop did not observe the stop signal in time and was aborted
    #[error("{task} loop did not stop within {timeout:?}")]
    TaskTimeout { task: Task, timeout: Duration },

    /// The loop ended abnormally (panic or cancellation)
    #[error("{task} loop failed: {source}")]
    TaskFailed {
        task: Task,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl ShutdownError {
    /// Loop that failed to stop
    #[must_use]
    pub const fn task(&self) -> Task {
        match self {
            Self::TaskTimeout { task, .. } | Self::TaskFailed { task, .. } => *task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ShutdownError::TaskTimeout {
            task: Task::Prune,
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "prune loop did not stop within 5s");
        assert_eq!(err.task(), Task::Prune);
    }

    #[test]
    fn test_task_names() {
        assert_eq!(Task::Ingest.to_string(), "ingest");
        assert_eq!(Task::Prune.as_str(), "prune");
    }
}
