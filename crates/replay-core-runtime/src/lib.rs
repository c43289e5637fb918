#![warn(missing_docs)]
//! `replay-core-runtime` - the live runtime around `replay-core`.
//!
//! ```text
//!        host editor
//!   Notification │  ▲ Directive
//!                ▼  │
//!   ┌────────────────────────────┐
//!   │ RuntimeHandle              │  async API, FIFO task queue, status watch
//!   ├────────────────────────────┤
//!   │ LiveSession                │  SnapshotStack + Projection + recorder
//!   ├────────────────────────────┤
//!   │ replay-core / -store       │  events, seek, effects, persistence
//!   └────────────────────────────┘
//! ```
//!
//! All state changes of one session (loads, seeks, playback and recording ticks, edits,
//! undo/redo) run as tasks on a single serializer, so they never interleave.
//!
//! # Example
//!
//! ```rust,no_run
//! use replay_core::NoBlobs;
//! use replay_core_runtime::{NullHost, RuntimeConfig, RuntimeHandle};
//! use std::sync::Arc;
//!
//! # async fn demo() -> replay_core_runtime::Result<()> {
//! let runtime = RuntimeHandle::spawn(RuntimeConfig::default(), NullHost, Arc::new(NoBlobs))?;
//! runtime.open("session.json").await?;
//! runtime.seek(12.5).await?;
//! runtime.play().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
pub mod recorder;
mod serializer;
mod session;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError, RuntimeStatus};
pub use host::{Host, NullHost, RecordingHost};
pub use recorder::Notification;
pub use serializer::RuntimeHandle;
pub use session::{EditCommand, LiveSession, Progress};
