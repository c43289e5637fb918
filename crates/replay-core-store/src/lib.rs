#![warn(missing_docs)]
//! `replay-core-store` - persistence for `replay-core`.
//!
//! - [`wire`]: the stable, tag-based JSON encoding of events.
//! - [`session_file`]: whole-session documents with a format-version guard and atomic saves.
//! - [`blob`]: content-addressed storage for file contents, usable as a
//!   [`ContentSource`](replay_core::ContentSource).
//!
//! # Example
//!
//! ```rust
//! use replay_core::{Event, EventKind, FileKind, SessionBody, SessionHead, Snapshot};
//! use replay_core_store::{session_from_json, session_to_json};
//!
//! let events = vec![Event::new(0.0, "file:///a.rs", EventKind::Init { file: FileKind::Empty })];
//! let snapshot = Snapshot::initial(
//!     SessionHead { duration: 1.0, ..Default::default() },
//!     SessionBody::new(events, Vec::new(), Vec::new()),
//! );
//!
//! let json = session_to_json(&snapshot).unwrap();
//! assert_eq!(session_from_json(&json).unwrap(), snapshot);
//! ```

pub mod blob;
mod error;
mod io;
pub mod session_file;
pub mod wire;

pub use blob::{BlobStore, DirBlobStore, MemoryBlobStore, content_hash, is_valid_hash};
pub use error::{Result, StoreError};
pub use session_file::{
    BodyDocument, FORMAT_VERSION, SessionDocument, load_session, save_session, session_from_json,
    session_to_json,
};
pub use wire::WireEvent;
