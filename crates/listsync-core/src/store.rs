//! Local list persistence
//!
//! Saves and loads the to-do list to/from the filesystem as a single JSON
//! array. Uses atomic writes (write to temp file, then rename) to prevent
//! corruption.
//!
//! Storage location: `~/.local/share/listsync/todos.json` (configurable via
//! `Config`)
//!
//! A missing or unreadable file is treated as an empty list so a fresh
//! client starts cleanly; only write failures surface as errors.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Item, ItemId};

/// Errors that can occur while persisting the list
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the list file
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to serialize the list
    #[error("Failed to serialize list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence layer for the to-do list
///
/// The whole list is written as one JSON blob on every change; the file is
/// small enough that rewriting it is cheaper than being clever.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted list
    ///
    /// Returns an empty list when the file is missing or cannot be parsed.
    /// A parse failure is logged and the corrupt content is left in place
    /// until the next save overwrites it.
    pub fn load(&self) -> Vec<Item> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Stored list is unreadable, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Save the full list, replacing whatever was stored before
    pub fn save_all(&self, items: &[Item]) -> StoreResult<()> {
        let json = serde_json::to_vec(items)?;
        atomic_write(&self.path, &json)
    }

    /// Append one item to the stored list
    pub fn append(&self, item: &Item) -> StoreResult<()> {
        let mut items = self.load();
        items.push(item.clone());
        self.save_all(&items)
    }

    /// Remove every stored item with the given id
    ///
    /// Removing an id that is not stored is a no-op.
    pub fn remove_by_id(&self, id: ItemId) -> StoreResult<()> {
        let mut items = self.load();
        items.retain(|item| item.id != id);
        self.save_all(&items)
    }
}

/// Write data to a file atomically
///
/// Writes to a temporary file in the same directory, syncs it, then renames
/// it over the target path so the file is never left half-written.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let write = |temp_path: &Path| -> io::Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };

    write(&temp_path).map_err(|source| StoreError::Write {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
