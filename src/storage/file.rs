//! Filesystem storage.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Result, YariError};
use crate::storage::traits::{Storage, StorageInput, StorageOutput};

/// Storage rooted at a directory on the local filesystem.
///
/// Reads go through memory maps by default; writes are buffered and fsynced
/// on `flush_and_sync`. `rename_file` maps to `std::fs::rename`, which
/// replaces the destination atomically on POSIX filesystems.
#[derive(Debug, Clone)]
pub struct FsStorage {
    dir: PathBuf,
    use_mmap: bool,
}

impl FsStorage {
    /// Open (creating if needed) storage rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FsStorage { dir, use_mmap: true })
    }

    /// Disable memory-mapped reads; files are read through buffered I/O.
    pub fn without_mmap(mut self) -> Self {
        self.use_mmap = false;
        self
    }

    /// The directory this storage is rooted at.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Storage for FsStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.path_of(name);
        let file = File::open(&path)
            .map_err(|_| YariError::not_found(format!("File not found: {name}")))?;
        let len = file.metadata()?.len();

        if self.use_mmap && len > 0 {
            // Safety: index files are immutable once published; they are
            // replaced by rename, never mutated in place.
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(Box::new(MmapInput { mmap, pos: 0 }))
        } else {
            Ok(Box::new(FsInput { file, len }))
        }
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path_of(name))?;
        Ok(Box::new(FsOutput {
            writer: BufWriter::new(file),
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        fs::remove_file(self.path_of(name))
            .map_err(|_| YariError::not_found(format!("File not found: {name}")))
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let meta = fs::metadata(self.path_of(name))
            .map_err(|_| YariError::not_found(format!("File not found: {name}")))?;
        Ok(meta.len())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        fs::rename(self.path_of(old_name), self.path_of(new_name))?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        // Directory fsync so renames themselves are durable.
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }
}

#[derive(Debug)]
struct FsInput {
    file: File,
    len: u64,
}

impl Read for FsInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl StorageInput for FsInput {
    fn size(&self) -> Result<u64> {
        Ok(self.len)
    }
}

#[derive(Debug)]
struct MmapInput {
    mmap: Mmap,
    pos: usize,
}

impl Read for MmapInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = &self.mmap[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl StorageInput for MmapInput {
    fn size(&self) -> Result<u64> {
        Ok(self.mmap.len() as u64)
    }
}

#[derive(Debug)]
struct FsOutput {
    writer: BufWriter<File>,
}

impl Write for FsOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FsOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}
