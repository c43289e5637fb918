//! Worktree: the resources known to a session at one point of the timeline.
//!
//! Each entry is keyed by URI and owns an optional [`Document`], which in turn may be bound to
//! at most one [`Editor`]. An editor never exists without its document.

use crate::document::Document;
use crate::error::{ReplayError, Result};
use crate::position::{LineRange, Selection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a worktree entry is backed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FileKind {
    /// A directory. Never has a document.
    Dir,
    /// An empty file.
    Empty,
    /// A file whose content is a locally stored blob.
    LocalBlob {
        /// Content hash of the blob.
        hash: String,
    },
    /// A file whose content comes from a git object.
    GitBlob {
        /// Content hash of the blob.
        hash: String,
        /// Commit the blob was taken from, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        revision: Option<String>,
    },
}

impl FileKind {
    /// Content hash of the blob backing this entry, if any.
    pub fn blob_hash(&self) -> Option<&str> {
        match self {
            Self::LocalBlob { hash } | Self::GitBlob { hash, .. } => Some(hash),
            Self::Dir | Self::Empty => None,
        }
    }
}

/// Supplies the text of files that are opened without inline content.
///
/// Reading may block on I/O; the runtime only calls it from inside its serialized task.
pub trait ContentSource {
    /// Return the full text of the blob with content hash `hash`.
    fn read_blob(&self, hash: &str) -> std::result::Result<String, String>;
}

/// A [`ContentSource`] with no blobs at all; every read fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlobs;

impl ContentSource for NoBlobs {
    fn read_blob(&self, hash: &str) -> std::result::Result<String, String> {
        Err(format!("blob {hash} not available"))
    }
}

/// Read the initial text of `uri` as described by `file`.
pub(crate) fn read_file_text(
    uri: &str,
    file: &FileKind,
    content: &dyn ContentSource,
) -> Result<String> {
    match file {
        FileKind::Dir => Err(ReplayError::NotAFile {
            uri: uri.to_string(),
        }),
        FileKind::Empty => Ok(String::new()),
        FileKind::LocalBlob { hash } | FileKind::GitBlob { hash, .. } => content
            .read_blob(hash)
            .map_err(|reason| ReplayError::ContentUnavailable {
                uri: uri.to_string(),
                reason,
            }),
    }
}

/// A document shown in the editing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    /// Cursor selections; the first one is primary.
    pub selections: Vec<Selection>,
    /// Visible line range.
    pub visible_range: LineRange,
}

/// One resource of the worktree.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktreeEntry {
    /// How the entry is backed.
    pub file: FileKind,
    /// The open document, if any.
    pub document: Option<Document>,
    /// The editor bound to `document`, if any.
    pub editor: Option<Editor>,
}

impl WorktreeEntry {
    /// An entry with neither document nor editor.
    pub fn new(file: FileKind) -> Self {
        Self {
            file,
            document: None,
            editor: None,
        }
    }
}

/// The in-memory projection of a session at one boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceState {
    entries: BTreeMap<String, WorktreeEntry>,
    active_uri: Option<String>,
}

impl WorkspaceState {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worktree entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the worktree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in URI order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &WorktreeEntry)> {
        self.entries.iter().map(|(uri, e)| (uri.as_str(), e))
    }

    /// Look up an entry.
    pub fn entry(&self, uri: &str) -> Option<&WorktreeEntry> {
        self.entries.get(uri)
    }

    /// The open document for `uri`.
    pub fn document(&self, uri: &str) -> Option<&Document> {
        self.entries.get(uri)?.document.as_ref()
    }

    /// The editor for `uri`.
    pub fn editor(&self, uri: &str) -> Option<&Editor> {
        self.entries.get(uri)?.editor.as_ref()
    }

    /// URI of the active editor. `None` if no editor was shown or the active one was closed.
    pub fn active_uri(&self) -> Option<&str> {
        let uri = self.active_uri.as_deref()?;
        self.editor(uri).map(|_| uri)
    }

    /// URI recorded as active, even if its editor has since been closed.
    pub fn last_active_uri(&self) -> Option<&str> {
        self.active_uri.as_deref()
    }

    pub(crate) fn set_active_uri(&mut self, uri: Option<String>) {
        self.active_uri = uri;
    }

    pub(crate) fn insert_entry(&mut self, uri: &str, entry: WorktreeEntry) -> Result<()> {
        if self.entries.contains_key(uri) {
            return Err(ReplayError::WorktreeEntryExists(uri.to_string()));
        }
        self.entries.insert(uri.to_string(), entry);
        Ok(())
    }

    pub(crate) fn remove_entry(&mut self, uri: &str) -> Result<WorktreeEntry> {
        self.entries
            .remove(uri)
            .ok_or_else(|| ReplayError::MissingWorktreeEntry(uri.to_string()))
    }

    pub(crate) fn entry_mut(&mut self, uri: &str) -> Result<&mut WorktreeEntry> {
        self.entries
            .get_mut(uri)
            .ok_or_else(|| ReplayError::MissingWorktreeEntry(uri.to_string()))
    }

    pub(crate) fn document_mut(&mut self, uri: &str) -> Result<&mut Document> {
        self.entry_mut(uri)?
            .document
            .as_mut()
            .ok_or_else(|| ReplayError::MissingDocument(uri.to_string()))
    }

    pub(crate) fn editor_mut(&mut self, uri: &str) -> Result<&mut Editor> {
        self.entry_mut(uri)?
            .editor
            .as_mut()
            .ok_or_else(|| ReplayError::MissingEditor(uri.to_string()))
    }
}
