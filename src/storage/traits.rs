//! Storage abstraction traits.

use std::fmt::Debug;
use std::io::{Read, Write};

use crate::error::Result;

/// A flat namespace of named byte files.
///
/// Implementations must make `rename_file` an atomic replace of the
/// destination; the commit protocol depends on it.
pub trait Storage: Send + Sync + Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing content.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all file names in the storage.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Atomically rename a file, replacing any existing destination.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Sync all pending writes to durable storage.
    fn sync(&self) -> Result<()>;
}

/// A readable file handle.
pub trait StorageInput: Read + Send + Debug {
    /// Total size of the file in bytes.
    fn size(&self) -> Result<u64>;
}

/// A writable file handle.
pub trait StorageOutput: Write + Send + Debug {
    /// Flush buffered data and sync it to durable storage.
    fn flush_and_sync(&mut self) -> Result<()>;
}
