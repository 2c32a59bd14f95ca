//! Index handle: the manifest and the writer/reader entry points.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::PerFieldAnalyzer;
use crate::error::{Result, YariError};
use crate::index::reader::IndexReader;
use crate::index::segment::SegmentInfo;
use crate::index::writer::IndexWriter;
use crate::storage::{self, FsStorage, MemoryStorage, Storage};

const MANIFEST_FILE: &str = "manifest.json";

/// The committed state of the index: an ordered list of segments.
///
/// The manifest is the single commit point. It is replaced atomically, so a
/// crash mid-commit leaves the previous generation fully intact and any
/// half-written segment files are unreferenced garbage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Monotonically increasing commit counter.
    pub generation: u64,
    /// Segments in creation order. A document's index-wide id is its
    /// segment-local id plus the doc counts of all earlier segments.
    pub segments: Vec<SegmentInfo>,
}

impl Manifest {
    /// Total documents across all segments, deleted ones included.
    pub fn max_doc(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.doc_count)).sum()
    }

    /// Load the manifest from storage.
    pub fn load(storage: &dyn Storage) -> Result<Manifest> {
        let bytes = storage::read_file(storage, MANIFEST_FILE)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Atomically publish this manifest as the new commit point.
    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        storage::write_file_atomic(storage, MANIFEST_FILE, &bytes)?;
        storage.sync()
    }

    /// Whether a manifest exists in storage.
    pub fn exists(storage: &dyn Storage) -> bool {
        storage.file_exists(MANIFEST_FILE)
    }
}

/// Index configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Analyzer shared by the writer and the query parser.
    pub analyzer: Arc<PerFieldAnalyzer>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            analyzer: Arc::new(PerFieldAnalyzer::default()),
        }
    }
}

/// A handle on an index in some storage.
///
/// The handle is cheap to clone and hands out readers and writers. At most
/// one writer exists per handle at a time; readers are snapshots of the
/// manifest at open and are unaffected by later commits.
#[derive(Debug, Clone)]
pub struct Index {
    storage: Arc<dyn Storage>,
    config: IndexConfig,
    writer_active: Arc<AtomicBool>,
}

impl Index {
    /// Open an index in the given storage, creating an empty one if no
    /// manifest exists yet.
    pub fn open(storage: Arc<dyn Storage>, config: IndexConfig) -> Result<Index> {
        if !Manifest::exists(storage.as_ref()) {
            Manifest::default().save(storage.as_ref())?;
        }
        Ok(Index {
            storage,
            config,
            writer_active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Open an index in a filesystem directory.
    pub fn open_in_dir<P: AsRef<Path>>(dir: P, config: IndexConfig) -> Result<Index> {
        Self::open(Arc::new(FsStorage::open(dir)?), config)
    }

    /// Open an ephemeral in-memory index.
    pub fn in_memory(config: IndexConfig) -> Result<Index> {
        Self::open(Arc::new(MemoryStorage::new()), config)
    }

    /// The analyzer shared by the writer and the query parser.
    pub fn analyzer(&self) -> &Arc<PerFieldAnalyzer> {
        &self.config.analyzer
    }

    /// The storage backing this index.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Open the single writer. Fails while another writer from this handle
    /// is still open.
    pub fn writer(&self) -> Result<IndexWriter> {
        if self
            .writer_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(YariError::index("An index writer is already open"));
        }

        match Manifest::load(self.storage.as_ref()) {
            Ok(manifest) => Ok(IndexWriter::new(
                Arc::clone(&self.storage),
                Arc::clone(&self.config.analyzer),
                manifest,
                Arc::clone(&self.writer_active),
            )),
            Err(e) => {
                self.writer_active.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Open a snapshot reader over the current commit point.
    pub fn reader(&self) -> Result<IndexReader> {
        let manifest = Manifest::load(self.storage.as_ref())?;
        IndexReader::open(self.storage.as_ref(), &manifest)
    }

    /// Merge all segments into one, dropping deleted documents.
    pub fn optimize(&self) -> Result<()> {
        let mut writer = self.writer()?;
        writer.merge_all()?;
        writer.close()
    }
}
