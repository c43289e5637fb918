//! Recorder: turns host notifications into events.
//!
//! Reverse data is read from the live workspace *before* the event is applied, so every
//! recorded event un-applies exactly. Each event is stepped on a scratch copy of the workspace
//! first; a notification the workspace cannot accept never becomes an event.

use replay_core::{
    ContentChange, ContentSource, Direction, Event, EventKind, FileKind, LineEnding, LineRange,
    ReplayError, Result, Selection, Stepper, WorkspaceState,
};

/// Something the user did in the host editor while recording.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A file or directory became part of the workspace.
    EntryAdded {
        /// Resource.
        uri: String,
        /// How it is backed.
        file: FileKind,
    },
    /// A document was opened.
    DocumentOpened {
        /// Resource.
        uri: String,
        /// Inline text; `None` to read the entry's blob on replay.
        text: Option<String>,
        /// End-of-line marker.
        eol: LineEnding,
    },
    /// A document's text changed. Ranges refer to the text before the change.
    DocumentChanged {
        /// Resource.
        uri: String,
        /// Disjoint changes.
        changes: Vec<ContentChange>,
    },
    /// A document was closed.
    DocumentClosed {
        /// Resource.
        uri: String,
    },
    /// An editor was shown and became active.
    EditorShown {
        /// Resource.
        uri: String,
        /// Selections after showing.
        selections: Vec<Selection>,
        /// Visible lines after showing.
        visible_range: LineRange,
    },
    /// An editor was closed.
    EditorClosed {
        /// Resource.
        uri: String,
    },
    /// Selections changed.
    SelectionChanged {
        /// Resource.
        uri: String,
        /// New selections.
        selections: Vec<Selection>,
    },
    /// The viewport scrolled.
    Scrolled {
        /// Resource.
        uri: String,
        /// New visible lines.
        visible_range: LineRange,
    },
    /// A document was saved.
    Saved {
        /// Resource.
        uri: String,
    },
}

impl Notification {
    /// The resource the notification is about.
    pub fn uri(&self) -> &str {
        match self {
            Self::EntryAdded { uri, .. }
            | Self::DocumentOpened { uri, .. }
            | Self::DocumentChanged { uri, .. }
            | Self::DocumentClosed { uri }
            | Self::EditorShown { uri, .. }
            | Self::EditorClosed { uri }
            | Self::SelectionChanged { uri, .. }
            | Self::Scrolled { uri, .. }
            | Self::Saved { uri } => uri,
        }
    }
}

/// Build the event for `notification` at `clock`, capturing reverse data from `state`.
///
/// A single pure insertion becomes a `textInsert`; any other text change a `textChange`.
/// `content` resolves blobs for documents opened without inline text.
pub fn record(
    state: &WorkspaceState,
    content: &dyn ContentSource,
    clock: f64,
    notification: Notification,
) -> Result<Event> {
    let (uri, kind) = match notification {
        Notification::EntryAdded { uri, file } => {
            if state.entry(&uri).is_some() {
                return Err(ReplayError::WorktreeEntryExists(uri));
            }
            (uri, EventKind::Init { file })
        }
        Notification::DocumentOpened { uri, text, eol } => {
            if state.entry(&uri).is_none() {
                return Err(ReplayError::MissingWorktreeEntry(uri));
            }
            (uri, EventKind::OpenDocument { text, eol })
        }
        Notification::DocumentChanged { uri, changes } => {
            let mut shadow = state
                .document(&uri)
                .cloned()
                .ok_or_else(|| ReplayError::MissingDocument(uri.clone()))?;
            let reverse = shadow.apply_content_changes(&changes, true)?;
            let insertion = match (changes.as_slice(), reverse.as_slice()) {
                ([change], [rev]) if change.range.is_empty() && !change.text.is_empty() => {
                    Some((change.text.clone(), rev.range))
                }
                _ => None,
            };
            let kind = match insertion {
                Some((text, rev_range)) => EventKind::TextInsert { text, rev_range },
                None => EventKind::TextChange {
                    content_changes: changes,
                    rev_content_changes: reverse,
                },
            };
            (uri, kind)
        }
        Notification::DocumentClosed { uri } => {
            let doc = state
                .document(&uri)
                .ok_or_else(|| ReplayError::MissingDocument(uri.clone()))?;
            let kind = EventKind::CloseDocument {
                rev_text: doc.text(),
                rev_eol: doc.eol(),
            };
            (uri, kind)
        }
        Notification::EditorShown {
            uri,
            selections,
            visible_range,
        } => {
            if state.document(&uri).is_none() {
                return Err(ReplayError::MissingDocument(uri));
            }
            let previous = state.editor(&uri);
            let kind = EventKind::ShowEditor {
                selections,
                visible_range,
                rev_uri: state.last_active_uri().map(str::to_string),
                rev_selections: previous.map(|e| e.selections.clone()),
                rev_visible_range: previous.map(|e| e.visible_range),
            };
            (uri, kind)
        }
        Notification::EditorClosed { uri } => {
            let editor = state
                .editor(&uri)
                .ok_or_else(|| ReplayError::MissingEditor(uri.clone()))?;
            let kind = EventKind::CloseEditor {
                rev_selections: editor.selections.clone(),
                rev_visible_range: editor.visible_range,
            };
            (uri, kind)
        }
        Notification::SelectionChanged { uri, selections } => {
            let editor = state
                .editor(&uri)
                .ok_or_else(|| ReplayError::MissingEditor(uri.clone()))?;
            let kind = EventKind::Select {
                selections,
                rev_selections: editor.selections.clone(),
            };
            (uri, kind)
        }
        Notification::Scrolled { uri, visible_range } => {
            let editor = state
                .editor(&uri)
                .ok_or_else(|| ReplayError::MissingEditor(uri.clone()))?;
            let kind = EventKind::Scroll {
                visible_range,
                rev_visible_range: editor.visible_range,
            };
            (uri, kind)
        }
        Notification::Saved { uri } => {
            if state.entry(&uri).is_none() {
                return Err(ReplayError::MissingWorktreeEntry(uri));
            }
            (uri, EventKind::Save)
        }
    };
    let event = Event::new(clock, uri, kind);
    let mut scratch = state.clone();
    Stepper::new(content).step(&mut scratch, &event, Direction::Forward)?;
    Ok(event)
}
