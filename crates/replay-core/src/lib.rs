#![warn(missing_docs)]
//! Replay Core - Event-Sourced Workspace Replay Engine
//!
//! # Overview
//!
//! `replay-core` reconstructs a recorded coding session (documents, editors, cursors, viewports)
//! at any point of its timeline. A session is a chronologically ordered log of exactly
//! reversible events; the engine seeks through it in either direction, edits it structurally
//! (crop, speed change, merge, gap insertion) through an undo/redo stack of immutable snapshots,
//! and keeps a live projection in step with that stack by replaying small effects instead of
//! re-seeking from scratch.
//!
//! Everything in this crate is pure and synchronous. Persistence lives in `replay-core-store`;
//! the serialized runtime, host interface and recorder live in `replay-core-runtime`.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Projection (effect replay)                 │  ← Live state
//! ├─────────────────────────────────────────────┤
//! │  SnapshotStack + edit functions             │  ← Undo/redo
//! ├──────────────────────┬──────────────────────┤
//! │  Seek algorithm      │  Clock algebra       │  ← Timeline
//! ├──────────────────────┴──────────────────────┤
//! │  Events + Stepper                           │  ← Reversible operations
//! ├─────────────────────────────────────────────┤
//! │  Document (rope-backed)                     │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use replay_core::{
//!     Event, EventKind, FileKind, LineEnding, NoBlobs, Position, Projection,
//!     Selection, SessionBody, SessionHead, Snapshot, Stepper,
//! };
//!
//! let uri = "file:///main.rs";
//! let events = vec![
//!     Event::new(0.0, uri, EventKind::Init { file: FileKind::Empty }),
//!     Event::new(0.0, uri, EventKind::OpenDocument { text: Some("fn main() {}".into()), eol: LineEnding::Lf }),
//!     Event::new(1.0, uri, EventKind::Select {
//!         selections: vec![Selection::caret(Position::new(0, 3))],
//!         rev_selections: Vec::new(),
//!     }),
//! ];
//! let snapshot = Snapshot::initial(
//!     SessionHead { duration: 2.0, ..SessionHead::default() },
//!     SessionBody::new(events, Vec::new(), Vec::new()),
//! );
//!
//! let mut stepper = Stepper::new(&NoBlobs);
//! let mut projection = Projection::new();
//! projection.load(&snapshot, &mut stepper).unwrap();
//! assert_eq!(projection.boundary(), Some(1));
//!
//! let text = projection.state().document(uri).unwrap().text();
//! assert_eq!(text, "fn main() {}");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - line-oriented text buffer with reversible content changes
//! - [`event`] / [`stepper`] - the event model and its single dispatch point
//! - [`seek`] - seek plans over the event sequence
//! - [`clock`] - clock algebra shared by edits and effects
//! - [`session`] / [`edit`] / [`history`] - snapshots, edit functions, undo/redo
//! - [`effect`] / [`live`] - effects and the live projection that replays them

pub mod clock;
pub mod document;
pub mod edit;
pub mod effect;
mod error;
pub mod event;
pub mod history;
pub mod line_ending;
pub mod live;
pub mod position;
pub mod seek;
pub mod session;
pub mod stepper;
pub mod worktree;

pub use clock::ClockRange;
pub use document::{ContentChange, Document};
pub use edit::{BodyPatch, Edit, EditContext};
pub use effect::Effect;
pub use error::{ReplayError, Result};
pub use event::{Direction, Event, EventKind, EventTag};
pub use history::{SnapshotStack, Transition};
pub use line_ending::LineEnding;
pub use live::Projection;
pub use position::{LineRange, Position, Range, Selection};
pub use seek::{SeekPlan, compute_seek_plan, compute_sync_plan};
pub use session::{
    FocusMarker, MediaKind, MediaTrack, SessionBody, SessionHead, Snapshot, SurfaceSelection,
    TocItem,
};
pub use stepper::{Directive, Stepper};
pub use worktree::{ContentSource, Editor, FileKind, NoBlobs, WorkspaceState, WorktreeEntry};
