//! Content-addressed blob storage.
//!
//! File contents referenced by `init` events (`localBlob` / `gitBlob`) live outside the session
//! document, keyed by the BLAKE3 hash of their bytes rendered as 64 lowercase hex digits. Both
//! stores implement [`ContentSource`], so they can back a [`Stepper`](replay_core::Stepper)
//! directly.

use crate::error::{Result, StoreError};
use crate::io::write_atomic;
use replay_core::ContentSource;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Hash `bytes` the way blobs are keyed.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Returns `true` if `hash` looks like a key produced by [`content_hash`].
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64
        && !hash.bytes().any(|b| b.is_ascii_uppercase())
        && hex::decode(hash).is_ok_and(|bytes| bytes.len() == blake3::OUT_LEN)
}

fn check_hash(hash: &str) -> Result<()> {
    if is_valid_hash(hash) {
        Ok(())
    } else {
        Err(StoreError::InvalidHash(hash.to_string()))
    }
}

/// Storage for document contents.
pub trait BlobStore {
    /// Store `text` and return its hash. Storing the same text twice is a no-op.
    fn put(&mut self, text: &str) -> Result<String>;

    /// Read the text stored under `hash`.
    fn get(&self, hash: &str) -> Result<String>;

    /// Returns `true` if a blob is stored under `hash`.
    fn contains(&self, hash: &str) -> bool;
}

/// Blobs kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, text: &str) -> Result<String> {
        let hash = content_hash(text.as_bytes());
        self.blobs
            .entry(hash.clone())
            .or_insert_with(|| text.to_string());
        Ok(hash)
    }

    fn get(&self, hash: &str) -> Result<String> {
        self.blobs
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::MissingBlob(hash.to_string()))
    }

    fn contains(&self, hash: &str) -> bool {
        self.blobs.contains_key(hash)
    }
}

impl ContentSource for MemoryBlobStore {
    fn read_blob(&self, hash: &str) -> std::result::Result<String, String> {
        self.get(hash).map_err(|err| err.to_string())
    }
}

/// Blobs stored as files named by their hash under one directory.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }
}

impl BlobStore for DirBlobStore {
    fn put(&mut self, text: &str) -> Result<String> {
        let hash = content_hash(text.as_bytes());
        let path = self.path_of(&hash);
        if !path.exists() {
            write_atomic(&path, text.as_bytes())?;
            trace!(%hash, bytes = text.len(), "stored blob");
        }
        Ok(hash)
    }

    fn get(&self, hash: &str) -> Result<String> {
        check_hash(hash)?;
        let bytes = match std::fs::read(self.path_of(hash)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::MissingBlob(hash.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        if content_hash(&bytes) != hash {
            return Err(StoreError::CorruptBlob(hash.to_string()));
        }
        String::from_utf8(bytes).map_err(|_| StoreError::NotText(hash.to_string()))
    }

    fn contains(&self, hash: &str) -> bool {
        is_valid_hash(hash) && self.path_of(hash).is_file()
    }
}

impl ContentSource for DirBlobStore {
    fn read_blob(&self, hash: &str) -> std::result::Result<String, String> {
        self.get(hash).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_shape() {
        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert!(is_valid_hash(&hash));
        assert_eq!(hash, blake3::hash(b"hello").to_hex().as_str());
    }

    #[test]
    fn test_invalid_hashes() {
        assert!(!is_valid_hash("abc"));
        assert!(!is_valid_hash(&"g".repeat(64)));
        assert!(!is_valid_hash(&content_hash(b"x").to_uppercase()));
        assert!(!is_valid_hash("../../etc/passwd"));
    }

    #[test]
    fn test_memory_store_dedupes() {
        let mut store = MemoryBlobStore::new();
        let a = store.put("fn main() {}\n").unwrap();
        let b = store.put("fn main() {}\n").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.read_blob(&a).unwrap(), "fn main() {}\n");
        assert!(store.read_blob(&content_hash(b"other")).is_err());
    }
}
