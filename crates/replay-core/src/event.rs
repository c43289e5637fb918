//! Event Model
//!
//! A closed set of timestamped, exactly reversible operations over documents, editors and
//! worktree entries. Every forward field has a matching reverse field recorded at capture time,
//! so an event can be un-applied without consulting any other event.

use crate::document::ContentChange;
use crate::line_ending::LineEnding;
use crate::position::{LineRange, Range, Selection};
use crate::worktree::FileKind;

/// Direction in which events (or snapshot transitions) are crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Apply forward fields.
    Forward,
    /// Apply reverse fields.
    Backward,
}

impl Direction {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Stable numeric tags used by the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventTag {
    /// [`EventKind::Init`]
    Init = 0,
    /// [`EventKind::TextChange`]
    TextChange = 1,
    /// [`EventKind::OpenDocument`]
    OpenDocument = 2,
    /// [`EventKind::CloseDocument`]
    CloseDocument = 3,
    /// [`EventKind::ShowEditor`]
    ShowEditor = 4,
    /// [`EventKind::CloseEditor`]
    CloseEditor = 5,
    /// [`EventKind::Select`]
    Select = 6,
    /// [`EventKind::Scroll`]
    Scroll = 7,
    /// [`EventKind::Save`]
    Save = 8,
    /// [`EventKind::TextInsert`]
    TextInsert = 9,
}

impl EventTag {
    /// Parse a wire tag.
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Init,
            1 => Self::TextChange,
            2 => Self::OpenDocument,
            3 => Self::CloseDocument,
            4 => Self::ShowEditor,
            5 => Self::CloseEditor,
            6 => Self::Select,
            7 => Self::Scroll,
            8 => Self::Save,
            9 => Self::TextInsert,
            _ => return None,
        })
    }
}

/// The payload of an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Declares a worktree entry.
    Init {
        /// How the entry is backed.
        file: FileKind,
    },
    /// Replaces one or more disjoint ranges of a document.
    TextChange {
        /// Changes, relative to the document before the event.
        content_changes: Vec<ContentChange>,
        /// Changes restoring the document, relative to the document after the event.
        rev_content_changes: Vec<ContentChange>,
    },
    /// Single-cursor insertion without deletion (typing).
    TextInsert {
        /// Inserted text.
        text: String,
        /// Range the inserted text occupies after the event; its start is the insert point.
        rev_range: Range,
    },
    /// Opens a document.
    OpenDocument {
        /// Initial text; `None` reads the entry's backing file.
        text: Option<String>,
        /// End-of-line marker of the document.
        eol: LineEnding,
    },
    /// Closes a document.
    CloseDocument {
        /// Text of the document when it was closed.
        rev_text: String,
        /// End-of-line marker of the document when it was closed.
        rev_eol: LineEnding,
    },
    /// Shows (and activates) an editor, creating it if needed.
    ShowEditor {
        /// Selections after the event.
        selections: Vec<Selection>,
        /// Visible range after the event.
        visible_range: LineRange,
        /// URI that was active before the event.
        rev_uri: Option<String>,
        /// Selections before the event; `None` if the editor did not exist.
        rev_selections: Option<Vec<Selection>>,
        /// Visible range before the event; `None` if the editor did not exist.
        rev_visible_range: Option<LineRange>,
    },
    /// Closes an editor; the document stays open.
    CloseEditor {
        /// Selections of the editor when it was closed.
        rev_selections: Vec<Selection>,
        /// Visible range of the editor when it was closed.
        rev_visible_range: LineRange,
    },
    /// Changes an editor's selections.
    Select {
        /// Selections after the event.
        selections: Vec<Selection>,
        /// Selections before the event.
        rev_selections: Vec<Selection>,
    },
    /// Scrolls an editor.
    Scroll {
        /// Visible range after the event.
        visible_range: LineRange,
        /// Visible range before the event.
        rev_visible_range: LineRange,
    },
    /// A document was saved. No state change.
    Save,
}

impl EventKind {
    /// The wire tag of this kind.
    pub fn tag(&self) -> EventTag {
        match self {
            Self::Init { .. } => EventTag::Init,
            Self::TextChange { .. } => EventTag::TextChange,
            Self::TextInsert { .. } => EventTag::TextInsert,
            Self::OpenDocument { .. } => EventTag::OpenDocument,
            Self::CloseDocument { .. } => EventTag::CloseDocument,
            Self::ShowEditor { .. } => EventTag::ShowEditor,
            Self::CloseEditor { .. } => EventTag::CloseEditor,
            Self::Select { .. } => EventTag::Select,
            Self::Scroll { .. } => EventTag::Scroll,
            Self::Save => EventTag::Save,
        }
    }

    /// Short name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::TextChange { .. } => "textChange",
            Self::TextInsert { .. } => "textInsert",
            Self::OpenDocument { .. } => "openDocument",
            Self::CloseDocument { .. } => "closeDocument",
            Self::ShowEditor { .. } => "showEditor",
            Self::CloseEditor { .. } => "closeEditor",
            Self::Select { .. } => "select",
            Self::Scroll { .. } => "scroll",
            Self::Save => "save",
        }
    }

    /// Returns `true` if the event changes document text.
    pub fn is_text_edit(&self) -> bool {
        matches!(self, Self::TextChange { .. } | Self::TextInsert { .. })
    }
}

/// A timestamped, reversible operation on one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds since session start.
    pub clock: f64,
    /// Resource the event applies to.
    pub uri: String,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Create an event.
    pub fn new(clock: f64, uri: impl Into<String>, kind: EventKind) -> Self {
        Self {
            clock,
            uri: uri.into(),
            kind,
        }
    }

    /// The same event at another clock.
    pub fn with_clock(&self, clock: f64) -> Self {
        Self {
            clock,
            ..self.clone()
        }
    }
}
