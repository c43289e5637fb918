//! Event wire format.
//!
//! Every event is one flat JSON object: an integer `tag`, the `clock`, the `uri`, and the
//! forward/reverse fields of its kind in camelCase. Fields that do not belong to the tag are
//! omitted on write and ignored on read.
//!
//! ```text
//! {"tag":9,"clock":1.5,"uri":"file:///a.rs","text":"x","revRange":[0,3,0,4]}
//! ```
//!
//! Tags are stable across versions (see [`EventTag`]); positions, ranges and selections are flat
//! integer arrays.

use crate::error::{Result, StoreError};
use replay_core::{
    ContentChange, Event, EventKind, EventTag, FileKind, LineEnding, LineRange, Range, Selection,
};
use serde::{Deserialize, Serialize};

/// Serialized form of one [`Event`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    /// Numeric kind, see [`EventTag`].
    pub tag: u8,
    /// Seconds since session start.
    pub clock: f64,
    /// Target resource.
    pub uri: String,

    /// `init`: how the entry is backed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileKind>,
    /// `textChange`: forward changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_changes: Option<Vec<ContentChange>>,
    /// `textChange`: reverse changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_content_changes: Option<Vec<ContentChange>>,
    /// `textInsert`: inserted text. `openDocument`: inline text, absent when read from a blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `textInsert`: range of the inserted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_range: Option<Range>,
    /// `openDocument`: end-of-line marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eol: Option<LineEnding>,
    /// `closeDocument`: text at close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_text: Option<String>,
    /// `closeDocument`: end-of-line marker at close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_eol: Option<LineEnding>,
    /// `showEditor`, `select`: selections after the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<Selection>>,
    /// `showEditor`, `scroll`: visible range after the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_range: Option<LineRange>,
    /// `showEditor`: previously active resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_uri: Option<String>,
    /// `showEditor`, `closeEditor`, `select`: selections before the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_selections: Option<Vec<Selection>>,
    /// `showEditor`, `closeEditor`, `scroll`: visible range before the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_visible_range: Option<LineRange>,
}

impl From<&Event> for WireEvent {
    fn from(event: &Event) -> Self {
        let mut wire = WireEvent {
            tag: event.kind.tag() as u8,
            clock: event.clock,
            uri: event.uri.clone(),
            ..WireEvent::default()
        };
        match &event.kind {
            EventKind::Init { file } => wire.file = Some(file.clone()),
            EventKind::TextChange {
                content_changes,
                rev_content_changes,
            } => {
                wire.content_changes = Some(content_changes.clone());
                wire.rev_content_changes = Some(rev_content_changes.clone());
            }
            EventKind::TextInsert { text, rev_range } => {
                wire.text = Some(text.clone());
                wire.rev_range = Some(*rev_range);
            }
            EventKind::OpenDocument { text, eol } => {
                wire.text = text.clone();
                wire.eol = Some(*eol);
            }
            EventKind::CloseDocument { rev_text, rev_eol } => {
                wire.rev_text = Some(rev_text.clone());
                wire.rev_eol = Some(*rev_eol);
            }
            EventKind::ShowEditor {
                selections,
                visible_range,
                rev_uri,
                rev_selections,
                rev_visible_range,
            } => {
                wire.selections = Some(selections.clone());
                wire.visible_range = Some(*visible_range);
                wire.rev_uri = rev_uri.clone();
                wire.rev_selections = rev_selections.clone();
                wire.rev_visible_range = *rev_visible_range;
            }
            EventKind::CloseEditor {
                rev_selections,
                rev_visible_range,
            } => {
                wire.rev_selections = Some(rev_selections.clone());
                wire.rev_visible_range = Some(*rev_visible_range);
            }
            EventKind::Select {
                selections,
                rev_selections,
            } => {
                wire.selections = Some(selections.clone());
                wire.rev_selections = Some(rev_selections.clone());
            }
            EventKind::Scroll {
                visible_range,
                rev_visible_range,
            } => {
                wire.visible_range = Some(*visible_range);
                wire.rev_visible_range = Some(*rev_visible_range);
            }
            EventKind::Save => {}
        }
        wire
    }
}

impl WireEvent {
    /// Decode into an [`Event`]. `index` is the event's position in the stored sequence and
    /// only used for error reporting.
    pub fn into_event(self, index: usize) -> Result<Event> {
        let raw = self.tag;
        let tag = EventTag::from_u8(raw).ok_or(StoreError::UnknownEventTag(raw))?;
        let missing = |field: &'static str| StoreError::MissingField {
            index,
            tag: raw,
            field,
        };

        let kind = match tag {
            EventTag::Init => EventKind::Init {
                file: self.file.ok_or_else(|| missing("file"))?,
            },
            EventTag::TextChange => EventKind::TextChange {
                content_changes: self.content_changes.ok_or_else(|| missing("contentChanges"))?,
                rev_content_changes: self
                    .rev_content_changes
                    .ok_or_else(|| missing("revContentChanges"))?,
            },
            EventTag::TextInsert => EventKind::TextInsert {
                text: self.text.ok_or_else(|| missing("text"))?,
                rev_range: self.rev_range.ok_or_else(|| missing("revRange"))?,
            },
            EventTag::OpenDocument => EventKind::OpenDocument {
                text: self.text,
                eol: self.eol.ok_or_else(|| missing("eol"))?,
            },
            EventTag::CloseDocument => EventKind::CloseDocument {
                rev_text: self.rev_text.ok_or_else(|| missing("revText"))?,
                rev_eol: self.rev_eol.ok_or_else(|| missing("revEol"))?,
            },
            EventTag::ShowEditor => EventKind::ShowEditor {
                selections: self.selections.ok_or_else(|| missing("selections"))?,
                visible_range: self.visible_range.ok_or_else(|| missing("visibleRange"))?,
                rev_uri: self.rev_uri,
                rev_selections: self.rev_selections,
                rev_visible_range: self.rev_visible_range,
            },
            EventTag::CloseEditor => EventKind::CloseEditor {
                rev_selections: self.rev_selections.ok_or_else(|| missing("revSelections"))?,
                rev_visible_range: self
                    .rev_visible_range
                    .ok_or_else(|| missing("revVisibleRange"))?,
            },
            EventTag::Select => EventKind::Select {
                selections: self.selections.ok_or_else(|| missing("selections"))?,
                rev_selections: self.rev_selections.ok_or_else(|| missing("revSelections"))?,
            },
            EventTag::Scroll => EventKind::Scroll {
                visible_range: self.visible_range.ok_or_else(|| missing("visibleRange"))?,
                rev_visible_range: self
                    .rev_visible_range
                    .ok_or_else(|| missing("revVisibleRange"))?,
            },
            EventTag::Save => EventKind::Save,
        };
        Ok(Event::new(self.clock, self.uri, kind))
    }
}
