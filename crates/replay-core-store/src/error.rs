use replay_core::ReplayError;
use thiserror::Error;

/// Errors raised while reading or writing sessions and blobs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    /// Filesystem failure.
    Io(#[from] std::io::Error),

    #[error("malformed session document: {0}")]
    /// The document is not valid JSON or does not match the session layout.
    Json(#[from] serde_json::Error),

    #[error("unsupported session format version {found} (supported: {supported})")]
    /// The document was written by an incompatible version.
    UnsupportedFormatVersion {
        /// Version found in the document.
        found: u32,
        /// Version this crate reads and writes.
        supported: u32,
    },

    #[error("unknown event tag {0}")]
    /// An event carries a tag outside the known set.
    UnknownEventTag(u8),

    #[error("event {index} (tag {tag}) is missing field `{field}`")]
    /// An event lacks a field its tag requires.
    MissingField {
        /// Position of the event in the stored sequence.
        index: usize,
        /// Wire tag of the event.
        tag: u8,
        /// camelCase name of the missing field.
        field: &'static str,
    },

    #[error("blob {0} not found")]
    /// No blob is stored under the hash.
    MissingBlob(String),

    #[error("invalid blob hash {0:?}")]
    /// Not a 64-digit lowercase hex string.
    InvalidHash(String),

    #[error("blob {0} does not match its hash")]
    /// Stored bytes hash to a different value.
    CorruptBlob(String),

    #[error("blob {0} is not valid UTF-8")]
    /// Blobs back text documents and must decode as UTF-8.
    NotText(String),

    #[error(transparent)]
    /// The stored session violates an engine invariant.
    Replay(#[from] ReplayError),
}

/// Convenience alias for results produced by this crate.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
