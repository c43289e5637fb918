//! The outbound side of the host interface.

use replay_core::Directive;
use std::sync::{Arc, Mutex, PoisonError};

/// The editor surface a runtime drives during replay.
pub trait Host: Send {
    /// Mirror a batch of replay steps, in order.
    fn apply(&mut self, directives: Vec<Directive>);
}

/// A host that ignores every directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn apply(&mut self, _directives: Vec<Directive>) {}
}

/// A host that keeps every directive it receives. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    log: Arc<Mutex<Vec<Directive>>>,
}

impl RecordingHost {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<Directive> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of directives received and not yet taken.
    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Host for RecordingHost {
    fn apply(&mut self, directives: Vec<Directive>) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(directives);
    }
}
