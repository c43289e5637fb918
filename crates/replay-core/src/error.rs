use crate::position::Range;
use thiserror::Error;

/// Errors raised by the replay engine.
///
/// Every variant except [`ReplayError::ContentUnavailable`] indicates a corrupted or mis-ordered
/// event sequence. Callers must not keep stepping after one of them: forward and backward replay
/// would no longer agree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("invalid range {range:?} for document {uri} ({line_count} lines)")]
    /// A range lies outside the document.
    InvalidRange {
        /// Target document.
        uri: String,
        /// Offending range.
        range: Range,
        /// Line count of the document at the time of the change.
        line_count: usize,
    },

    #[error("overlapping content changes in {uri}: {first:?} and {second:?}")]
    /// Two content changes of the same event overlap.
    OverlappingRanges {
        /// Target document.
        uri: String,
        /// The earlier range in document order.
        first: Range,
        /// The range overlapping `first`.
        second: Range,
    },

    #[error("no worktree entry for {0}")]
    /// An event references a URI with no matching worktree entry.
    MissingWorktreeEntry(String),

    #[error("worktree entry for {0} already exists")]
    /// `init` was applied for a URI that is already known.
    WorktreeEntryExists(String),

    #[error("no open document for {0}")]
    /// An event needs a document that is not open.
    MissingDocument(String),

    #[error("document {0} is already open")]
    /// A document was opened twice.
    DocumentAlreadyOpen(String),

    #[error("no editor for {0}")]
    /// An event needs an editor that does not exist.
    MissingEditor(String),

    #[error("editor for {0} is still open")]
    /// A document cannot be closed or re-created while its editor is shown.
    EditorStillOpen(String),

    #[error("{uri} is a directory and has no text content")]
    /// A directory cannot back a document.
    NotAFile {
        /// The directory's URI.
        uri: String,
    },

    #[error("content for {uri} is unavailable: {reason}")]
    /// The [`ContentSource`](crate::ContentSource) could not produce a file's text.
    ContentUnavailable {
        /// The file's URI.
        uri: String,
        /// Why the content could not be read.
        reason: String,
    },

    #[error("event index {index} out of bounds (len {len})")]
    /// An edit refers to an event index that does not exist.
    EventIndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of events in the sequence.
        len: usize,
    },

    #[error("clock {clock} at index {index} breaks the non-decreasing clock order")]
    /// An insertion or update would make clocks decrease in stored order.
    UnorderedClock {
        /// Index of the offending event.
        index: usize,
        /// The offending clock.
        clock: f64,
    },

    #[error("invalid clock value {0}")]
    /// Clocks must be finite and non-negative.
    InvalidClock(f64),

    #[error("invalid clock range [{start}, {end}]")]
    /// A clock range with `start > end` or non-finite endpoints.
    InvalidClockRange {
        /// Range start.
        start: f64,
        /// Range end.
        end: f64,
    },

    #[error("invalid speed factor {0}")]
    /// Speed factors must be finite and strictly positive.
    InvalidSpeedFactor(f64),

    #[error("table of contents index {0} out of bounds")]
    /// A TOC edit referenced a missing entry.
    TocIndexOutOfBounds(usize),

    #[error("media track {0} not found")]
    /// A media-track edit referenced a missing track.
    MediaTrackNotFound(String),

    #[error("media track {0} already exists")]
    /// A media track id was inserted twice.
    DuplicateMediaTrack(String),
}

/// Convenience alias for results produced by this crate.
pub type Result<T, E = ReplayError> = std::result::Result<T, E>;
