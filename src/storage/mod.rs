//! Pluggable byte storage underneath the index.
//!
//! The index never touches the filesystem directly; it goes through the
//! [`Storage`] trait so tests can run entirely in memory and production
//! indexes live on disk. Commit atomicity relies on `rename_file` being an
//! atomic replace, which both backends guarantee.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FsStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageInput, StorageOutput};

use crate::error::Result;

/// Read a whole file from storage.
pub fn read_file(storage: &dyn Storage, name: &str) -> Result<Vec<u8>> {
    let mut input = storage.open_input(name)?;
    let mut buf = Vec::with_capacity(input.size()? as usize);
    input.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Write a file through a temporary name and atomically rename it into
/// place. Readers see either the old content or the new, never a torn
/// write.
pub fn write_file_atomic(storage: &dyn Storage, name: &str, data: &[u8]) -> Result<()> {
    let tmp_name = format!("{name}.tmp");
    {
        let mut output = storage.create_output(&tmp_name)?;
        output.write_all(data)?;
        output.flush_and_sync()?;
    }
    storage.rename_file(&tmp_name, name)
}
