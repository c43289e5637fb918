use replay_core::ReplayError;
use replay_core_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a live runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuntimeStatus {
    /// Idle; the clock only moves on seeks.
    #[default]
    Paused,
    /// Ticks advance the clock and apply events.
    Playing,
    /// Ticks advance the clock past the end; host notifications become events.
    Recording,
    /// A task failed while mutating state. Only loading a session leaves this state.
    Failed(String),
}

impl RuntimeStatus {
    /// Returns `true` while ticks drive the clock.
    pub fn is_ticking(&self) -> bool {
        matches!(self, Self::Playing | Self::Recording)
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => f.write_str("paused"),
            Self::Playing => f.write_str("playing"),
            Self::Recording => f.write_str("recording"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Errors raised by the live runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid runtime configuration: {0}")]
    /// A configuration value is out of range or the document is malformed.
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    /// Filesystem failure.
    Io(#[from] std::io::Error),

    #[error("replay failed: {0}")]
    /// The engine rejected an event while mutating the live state. Fatal for the runtime.
    Replay(#[from] ReplayError),

    #[error("invalid edit: {0}")]
    /// An edit was rejected before anything changed.
    InvalidEdit(ReplayError),

    #[error("invalid notification: {0}")]
    /// The recorder rejected a host notification before anything changed.
    InvalidNotification(ReplayError),

    #[error(transparent)]
    /// Loading or saving a session failed; nothing changed.
    Store(#[from] StoreError),

    #[error("cannot {operation} while {status}")]
    /// The operation is not allowed in the current status.
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// Status at the time.
        status: RuntimeStatus,
    },

    #[error("runtime failed: {0}")]
    /// The runtime is in [`RuntimeStatus::Failed`].
    Failed(String),

    #[error("task was cancelled before it started")]
    /// A pause cleared the task from the queue.
    Cancelled,

    #[error("runtime has shut down")]
    /// The serializer task is gone.
    Shutdown,
}

impl RuntimeError {
    /// Returns `true` if the error left the live state partially mutated.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Replay(_))
    }
}

/// Convenience alias for results produced by this crate.
pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;
