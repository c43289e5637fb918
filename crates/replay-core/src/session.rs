//! Immutable session values: head, body and snapshots.
//!
//! Bodies share their collections through [`Arc`], so an edit that only touches the table of
//! contents does not copy the event sequence.

use crate::clock::ClockRange;
use crate::effect::Effect;
use crate::event::Event;
use crate::worktree::FileKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocItem {
    /// Entry title.
    pub title: String,
    /// Where the entry points on the timeline.
    pub clock: f64,
}

/// Marks which line of which document the session focuses at a clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusMarker {
    /// Where the marker sits on the timeline.
    pub clock: f64,
    /// Focused resource.
    pub uri: String,
    /// Focused line.
    pub line: usize,
    /// Text of the focused line when the marker was recorded.
    pub text: String,
}

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio-only track.
    Audio,
    /// Video track.
    Video,
    /// Still image shown for the track's range.
    Image,
}

/// Audio, video or image placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTrack {
    /// Unique track id.
    pub id: String,
    /// Track kind.
    pub kind: MediaKind,
    /// Display title.
    pub title: String,
    /// Where the track plays.
    pub clock_range: ClockRange,
    /// Backing file, usually a blob.
    pub file: FileKind,
}

/// Session metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHead {
    /// Length of the session in seconds.
    pub duration: f64,
    /// Table of contents, sorted by clock.
    #[serde(default)]
    pub toc: Vec<TocItem>,
    /// Last modification, in milliseconds since the UNIX epoch.
    #[serde(default)]
    pub modification_time: u64,
}

/// Session content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBody {
    /// Chronologically ordered events.
    pub events: Arc<Vec<Event>>,
    /// Focus markers, sorted by clock.
    pub focus_markers: Arc<Vec<FocusMarker>>,
    /// Media tracks.
    pub media_tracks: Arc<Vec<MediaTrack>>,
}

impl SessionBody {
    /// Build a body from owned collections.
    pub fn new(
        events: Vec<Event>,
        focus_markers: Vec<FocusMarker>,
        media_tracks: Vec<MediaTrack>,
    ) -> Self {
        Self {
            events: Arc::new(events),
            focus_markers: Arc::new(focus_markers),
            media_tracks: Arc::new(media_tracks),
        }
    }

    /// Index of the first event stamped earlier than its predecessor. `None` if clocks never
    /// decrease in stored order.
    pub fn first_unordered_event(&self) -> Option<usize> {
        self.events
            .windows(2)
            .position(|w| w[1].clock < w[0].clock)
            .map(|i| i + 1)
    }
}

/// What is selected in the editing surface (auxiliary, restored across undo/redo).
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceSelection {
    /// A clock range on the timeline.
    Range(ClockRange),
    /// A media track, by id.
    Track(String),
    /// A table-of-contents entry, by index.
    Toc(usize),
}

/// One immutable entry of the undo/redo stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Metadata.
    pub head: SessionHead,
    /// Content.
    pub body: SessionBody,
    /// What a live runtime must do to cross from the previous snapshot into this one.
    pub effects: Vec<Effect>,
}

impl Snapshot {
    /// The initial snapshot of a session (no effects).
    pub fn initial(head: SessionHead, body: SessionBody) -> Self {
        Self {
            head,
            body,
            effects: Vec::new(),
        }
    }

    /// The event sequence.
    pub fn events(&self) -> &[Event] {
        &self.body.events
    }

    /// Session duration.
    pub fn duration(&self) -> f64 {
        self.head.duration
    }
}
