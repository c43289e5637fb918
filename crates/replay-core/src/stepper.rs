//! Event stepper: applies one event, forward or backward, to a [`WorkspaceState`].
//!
//! Dispatch is an exhaustive `match` over [`EventKind`]; every arm validates the state it needs
//! before mutating anything, so a failed step leaves the workspace untouched.
//!
//! Each step also emits [`Directive`]s describing what a live editor surface has to do to mirror
//! the change. Callers that only need the in-memory projection can ignore them.

use crate::document::{ContentChange, Document};
use crate::error::{ReplayError, Result};
use crate::event::{Direction, Event, EventKind};
use crate::line_ending::LineEnding;
use crate::position::{LineRange, Range, Selection};
use crate::worktree::{ContentSource, Editor, FileKind, WorkspaceState, WorktreeEntry, read_file_text};

/// An instruction for the host editor surface, issued during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Open (or focus) the editor for `uri` at the given selections and viewport.
    Show {
        /// Target resource.
        uri: String,
        /// Selections to set.
        selections: Vec<Selection>,
        /// Line range to reveal.
        visible_range: LineRange,
    },
    /// Replace a range of a resource's text.
    ReplaceText {
        /// Target resource.
        uri: String,
        /// Range in the resource before the replacement.
        range: Range,
        /// Replacement text.
        text: String,
    },
    /// Set the selections of a shown resource.
    SetSelections {
        /// Target resource.
        uri: String,
        /// Selections to set.
        selections: Vec<Selection>,
    },
    /// Scroll a shown resource so that `range` is visible.
    Reveal {
        /// Target resource.
        uri: String,
        /// Line range to reveal.
        range: LineRange,
    },
    /// Close the editor surface of a resource.
    Close {
        /// Target resource.
        uri: String,
    },
}

/// Applies events and collects the resulting [`Directive`]s.
pub struct Stepper<'a> {
    content: &'a dyn ContentSource,
    directives: Vec<Directive>,
}

impl std::fmt::Debug for Stepper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stepper")
            .field("pending_directives", &self.directives.len())
            .finish()
    }
}

impl<'a> Stepper<'a> {
    /// Create a stepper reading file content from `content`.
    pub fn new(content: &'a dyn ContentSource) -> Self {
        Self {
            content,
            directives: Vec::new(),
        }
    }

    /// Directives emitted so far.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Take the directives emitted so far.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    /// Apply `event` to `state` in `direction`.
    pub fn step(
        &mut self,
        state: &mut WorkspaceState,
        event: &Event,
        direction: Direction,
    ) -> Result<()> {
        let uri = event.uri.as_str();
        match &event.kind {
            EventKind::Init { file } => self.init(state, uri, file, direction),
            EventKind::TextChange {
                content_changes,
                rev_content_changes,
            } => {
                let changes = match direction {
                    Direction::Forward => content_changes,
                    Direction::Backward => rev_content_changes,
                };
                self.change_text(state, uri, changes)
            }
            EventKind::TextInsert { text, rev_range } => {
                let change = match direction {
                    Direction::Forward => ContentChange::new(Range::caret(rev_range.start), text.clone()),
                    Direction::Backward => ContentChange::new(*rev_range, ""),
                };
                self.change_text(state, uri, std::slice::from_ref(&change))
            }
            EventKind::OpenDocument { text, eol } => match direction {
                Direction::Forward => self.open_document(state, uri, text.as_deref(), *eol),
                Direction::Backward => self.close_document(state, uri),
            },
            EventKind::CloseDocument { rev_text, rev_eol } => match direction {
                Direction::Forward => self.close_document(state, uri),
                Direction::Backward => self.open_document(state, uri, Some(rev_text), *rev_eol),
            },
            EventKind::ShowEditor {
                selections,
                visible_range,
                rev_uri,
                rev_selections,
                rev_visible_range,
            } => match direction {
                Direction::Forward => self.show_editor(state, uri, selections, *visible_range),
                Direction::Backward => self.unshow_editor(
                    state,
                    uri,
                    rev_uri.as_deref(),
                    rev_selections.as_deref(),
                    rev_visible_range.unwrap_or_default(),
                ),
            },
            EventKind::CloseEditor {
                rev_selections,
                rev_visible_range,
            } => match direction {
                Direction::Forward => self.close_editor(state, uri),
                Direction::Backward => self.reopen_editor(state, uri, rev_selections, *rev_visible_range),
            },
            EventKind::Select {
                selections,
                rev_selections,
            } => {
                let selections = match direction {
                    Direction::Forward => selections,
                    Direction::Backward => rev_selections,
                };
                state.editor_mut(uri)?.selections = selections.clone();
                self.directives.push(Directive::SetSelections {
                    uri: uri.to_string(),
                    selections: selections.clone(),
                });
                Ok(())
            }
            EventKind::Scroll {
                visible_range,
                rev_visible_range,
            } => {
                let range = match direction {
                    Direction::Forward => *visible_range,
                    Direction::Backward => *rev_visible_range,
                };
                state.editor_mut(uri)?.visible_range = range;
                self.directives.push(Directive::Reveal {
                    uri: uri.to_string(),
                    range,
                });
                Ok(())
            }
            EventKind::Save => state.entry_mut(uri).map(|_| ()),
        }
    }

    fn init(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        file: &FileKind,
        direction: Direction,
    ) -> Result<()> {
        match direction {
            Direction::Forward => state.insert_entry(uri, WorktreeEntry::new(file.clone())),
            Direction::Backward => {
                if state.entry_mut(uri)?.document.is_some() {
                    return Err(ReplayError::DocumentAlreadyOpen(uri.to_string()));
                }
                state.remove_entry(uri).map(|_| ())
            }
        }
    }

    fn change_text(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        changes: &[ContentChange],
    ) -> Result<()> {
        state.document_mut(uri)?.apply_content_changes(changes, false)?;
        for change in changes {
            self.directives.push(Directive::ReplaceText {
                uri: uri.to_string(),
                range: change.range,
                text: change.text.clone(),
            });
        }
        Ok(())
    }

    fn open_document(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        text: Option<&str>,
        eol: LineEnding,
    ) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.document.is_some() {
            return Err(ReplayError::DocumentAlreadyOpen(uri.to_string()));
        }
        let text = match text {
            Some(text) => text.to_string(),
            None => read_file_text(uri, &entry.file, self.content)?,
        };
        entry.document = Some(Document::new(uri, &text, eol));
        Ok(())
    }

    fn close_document(&mut self, state: &mut WorkspaceState, uri: &str) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.document.is_none() {
            return Err(ReplayError::MissingDocument(uri.to_string()));
        }
        if entry.editor.is_some() {
            return Err(ReplayError::EditorStillOpen(uri.to_string()));
        }
        entry.document = None;
        Ok(())
    }

    fn show_editor(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        selections: &[Selection],
        visible_range: LineRange,
    ) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.document.is_none() {
            return Err(ReplayError::MissingDocument(uri.to_string()));
        }
        entry.editor = Some(Editor {
            selections: selections.to_vec(),
            visible_range,
        });
        state.set_active_uri(Some(uri.to_string()));
        self.directives.push(Directive::Show {
            uri: uri.to_string(),
            selections: selections.to_vec(),
            visible_range,
        });
        Ok(())
    }

    fn unshow_editor(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        rev_uri: Option<&str>,
        rev_selections: Option<&[Selection]>,
        rev_visible_range: LineRange,
    ) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.editor.is_none() {
            return Err(ReplayError::MissingEditor(uri.to_string()));
        }
        match rev_selections {
            Some(selections) => {
                entry.editor = Some(Editor {
                    selections: selections.to_vec(),
                    visible_range: rev_visible_range,
                });
            }
            None => {
                entry.editor = None;
                self.directives.push(Directive::Close {
                    uri: uri.to_string(),
                });
            }
        }

        state.set_active_uri(rev_uri.map(str::to_string));
        if let Some(prev) = rev_uri
            && let Some(editor) = state.editor(prev)
        {
            self.directives.push(Directive::Show {
                uri: prev.to_string(),
                selections: editor.selections.clone(),
                visible_range: editor.visible_range,
            });
        }
        Ok(())
    }

    fn close_editor(&mut self, state: &mut WorkspaceState, uri: &str) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.editor.take().is_none() {
            return Err(ReplayError::MissingEditor(uri.to_string()));
        }
        self.directives.push(Directive::Close {
            uri: uri.to_string(),
        });
        Ok(())
    }

    fn reopen_editor(
        &mut self,
        state: &mut WorkspaceState,
        uri: &str,
        selections: &[Selection],
        visible_range: LineRange,
    ) -> Result<()> {
        let entry = state.entry_mut(uri)?;
        if entry.document.is_none() {
            return Err(ReplayError::MissingDocument(uri.to_string()));
        }
        entry.editor = Some(Editor {
            selections: selections.to_vec(),
            visible_range,
        });
        self.directives.push(Directive::Show {
            uri: uri.to_string(),
            selections: selections.to_vec(),
            visible_range,
        });
        Ok(())
    }
}
