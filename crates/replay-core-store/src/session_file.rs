//! Session documents: one JSON file per session.
//!
//! ```text
//! {
//!   "formatVersion": 1,
//!   "head": { "duration": 12.5, "toc": [...], "modificationTime": 1700000000000 },
//!   "body": { "events": [...], "focusMarkers": [...], "mediaTracks": [...] }
//! }
//! ```
//!
//! Loading is all-or-nothing: the whole document is parsed and validated before a [`Snapshot`]
//! is returned. Saving goes through a temporary sibling file that is renamed into place.

use crate::error::{Result, StoreError};
use crate::io::write_atomic;
use crate::wire::WireEvent;
use replay_core::clock::check_clock;
use replay_core::{FocusMarker, MediaTrack, ReplayError, SessionBody, SessionHead, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The only format version this crate reads and writes.
pub const FORMAT_VERSION: u32 = 1;

/// Serialized session body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDocument {
    /// Events in stored order.
    pub events: Vec<WireEvent>,
    /// Focus markers.
    #[serde(default)]
    pub focus_markers: Vec<FocusMarker>,
    /// Media tracks.
    #[serde(default)]
    pub media_tracks: Vec<MediaTrack>,
}

/// Serialized session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    /// Must equal [`FORMAT_VERSION`].
    pub format_version: u32,
    /// Session metadata.
    pub head: SessionHead,
    /// Session content.
    pub body: BodyDocument,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionProbe {
    format_version: u32,
}

impl SessionDocument {
    /// Capture the head and body of `snapshot`. Effects are not persisted.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            head: snapshot.head.clone(),
            body: BodyDocument {
                events: snapshot.events().iter().map(WireEvent::from).collect(),
                focus_markers: snapshot.body.focus_markers.to_vec(),
                media_tracks: snapshot.body.media_tracks.to_vec(),
            },
        }
    }

    /// Decode and validate into an initial [`Snapshot`].
    pub fn into_snapshot(self) -> Result<Snapshot> {
        if self.format_version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormatVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }
        check_clock(self.head.duration)?;

        let events = self
            .body
            .events
            .into_iter()
            .enumerate()
            .map(|(index, wire)| wire.into_event(index))
            .collect::<Result<Vec<_>>>()?;
        for event in &events {
            check_clock(event.clock)?;
        }

        let body = SessionBody::new(events, self.body.focus_markers, self.body.media_tracks);
        if let Some(index) = body.first_unordered_event() {
            return Err(ReplayError::UnorderedClock {
                index,
                clock: body.events[index].clock,
            }
            .into());
        }
        Ok(Snapshot::initial(self.head, body))
    }
}

/// Serialize `snapshot` as a session document.
pub fn session_to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SessionDocument::from_snapshot(
        snapshot,
    ))?)
}

/// Parse a session document.
///
/// The format version is checked before the rest of the document, so files written by another
/// version fail with [`StoreError::UnsupportedFormatVersion`] even if their layout differs.
pub fn session_from_json(text: &str) -> Result<Snapshot> {
    let probe: VersionProbe = serde_json::from_str(text)?;
    if probe.format_version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormatVersion {
            found: probe.format_version,
            supported: FORMAT_VERSION,
        });
    }
    serde_json::from_str::<SessionDocument>(text)?.into_snapshot()
}

/// Read a session document from `path`.
pub fn load_session(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let snapshot = session_from_json(&text)?;
    debug!(
        path = %path.display(),
        events = snapshot.events().len(),
        duration = snapshot.duration(),
        "loaded session"
    );
    Ok(snapshot)
}

/// Write `snapshot` to `path`, replacing any previous file atomically.
pub fn save_session(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let json = session_to_json(snapshot)?;
    write_atomic(path, json.as_bytes())?;
    debug!(
        path = %path.display(),
        events = snapshot.events().len(),
        "saved session"
    );
    Ok(())
}
