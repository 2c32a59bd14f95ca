//! Immutable segments and their on-storage representation.
//!
//! A segment is written once at commit and never mutated: updates and
//! deletes only flip bits in the sidecar live-docs file. Each file carries
//! a magic tag and a CRC32 of its payload so a torn or corrupt file is
//! detected at open instead of producing garbage hits.

use std::collections::BTreeMap;

use bit_vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, YariError};
use crate::index::posting::PostingList;
use crate::storage::{self, Storage};

const SEGMENT_MAGIC: &[u8; 4] = b"YSEG";
const DELETES_MAGIC: &[u8; 4] = b"YDEL";

/// Identity and size of a segment, as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Unique segment id (a UUID string).
    pub id: String,
    /// Total documents in the segment, deleted ones included.
    pub doc_count: u32,
}

impl SegmentInfo {
    /// The name of the segment's data file.
    pub fn data_file(&self) -> String {
        format!("segment_{}.bin", self.id)
    }

    /// The name of the segment's live-docs sidecar file.
    pub fn deletes_file(&self) -> String {
        format!("segment_{}.del", self.id)
    }
}

/// The full decoded contents of one segment.
///
/// All per-document vectors are indexed by segment-local doc id, so every
/// one of them has `doc_count` entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentData {
    /// Documents in the segment, deleted ones included.
    pub doc_count: u32,
    /// field -> term -> postings. BTreeMaps keep terms sorted, which the
    /// prefix, wildcard, fuzzy, and range queries scan in order.
    pub terms: BTreeMap<String, BTreeMap<String, PostingList>>,
    /// field -> per-document token count, for length normalization.
    pub field_lengths: BTreeMap<String, Vec<u32>>,
    /// Stored projections of the original documents.
    pub stored: Vec<Document>,
    /// field -> per-document numeric sort value.
    pub numeric_doc_values: BTreeMap<String, Vec<Option<f64>>>,
    /// field -> per-document string sort value.
    pub sorted_doc_values: BTreeMap<String, Vec<Option<String>>>,
    /// field -> per-document facet values (possibly several per document).
    pub facet_doc_values: BTreeMap<String, Vec<Vec<String>>>,
}

impl SegmentData {
    /// Postings for a term in a field, if present.
    pub fn postings(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.terms.get(field)?.get(term)
    }

    /// Total tokens indexed for a field across all documents.
    pub fn total_field_length(&self, field: &str) -> u64 {
        self.field_lengths
            .get(field)
            .map(|lens| lens.iter().map(|&l| u64::from(l)).sum())
            .unwrap_or(0)
    }
}

/// Per-segment liveness bitmap. A cleared bit means the document is
/// deleted.
#[derive(Debug, Clone)]
pub struct LiveDocs {
    bits: BitVec,
    live: u32,
}

#[derive(Serialize, Deserialize)]
struct LiveDocsRepr {
    len: u32,
    bytes: Vec<u8>,
}

impl LiveDocs {
    /// All documents live.
    pub fn all_live(doc_count: u32) -> Self {
        LiveDocs {
            bits: BitVec::from_elem(doc_count as usize, true),
            live: doc_count,
        }
    }

    /// Whether the document is live.
    pub fn is_live(&self, doc_id: u32) -> bool {
        self.bits.get(doc_id as usize).unwrap_or(false)
    }

    /// Mark a document deleted. Returns true if it was live.
    pub fn delete(&mut self, doc_id: u32) -> bool {
        if self.is_live(doc_id) {
            self.bits.set(doc_id as usize, false);
            self.live -= 1;
            true
        } else {
            false
        }
    }

    /// Number of live documents.
    pub fn live_count(&self) -> u32 {
        self.live
    }

    /// Number of deleted documents.
    pub fn deleted_count(&self) -> u32 {
        self.bits.len() as u32 - self.live
    }

    /// Whether any document has been deleted.
    pub fn has_deletions(&self) -> bool {
        self.live < self.bits.len() as u32
    }

    fn to_repr(&self) -> LiveDocsRepr {
        LiveDocsRepr {
            len: self.bits.len() as u32,
            bytes: self.bits.to_bytes(),
        }
    }

    fn from_repr(repr: LiveDocsRepr) -> Self {
        let mut bits = BitVec::from_bytes(&repr.bytes);
        bits.truncate(repr.len as usize);
        let live = bits.iter().filter(|&b| b).count() as u32;
        LiveDocs { bits, live }
    }
}

/// Frame a payload with a magic tag and CRC32 checksum.
fn encode_framed(magic: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(magic);
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Strip and verify the frame, returning the payload.
fn decode_framed<'a>(magic: &[u8; 4], data: &'a [u8], name: &str) -> Result<&'a [u8]> {
    if data.len() < 8 || &data[..4] != magic {
        return Err(YariError::index(format!("Corrupt index file: {name}")));
    }
    let expected = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let payload = &data[8..];
    if crc32fast::hash(payload) != expected {
        return Err(YariError::index(format!(
            "Checksum mismatch in index file: {name}"
        )));
    }
    Ok(payload)
}

/// Write a segment's data file.
pub fn write_segment(storage: &dyn Storage, info: &SegmentInfo, data: &SegmentData) -> Result<()> {
    let payload =
        bincode::serialize(data).map_err(|e| YariError::serialization(e.to_string()))?;
    storage::write_file_atomic(storage, &info.data_file(), &encode_framed(SEGMENT_MAGIC, &payload))
}

/// Read and verify a segment's data file.
pub fn read_segment(storage: &dyn Storage, info: &SegmentInfo) -> Result<SegmentData> {
    let name = info.data_file();
    let bytes = storage::read_file(storage, &name)?;
    let payload = decode_framed(SEGMENT_MAGIC, &bytes, &name)?;
    bincode::deserialize(payload).map_err(|e| YariError::serialization(e.to_string()))
}

/// Write a segment's live-docs sidecar.
pub fn write_live_docs(
    storage: &dyn Storage,
    info: &SegmentInfo,
    live_docs: &LiveDocs,
) -> Result<()> {
    let payload = bincode::serialize(&live_docs.to_repr())
        .map_err(|e| YariError::serialization(e.to_string()))?;
    storage::write_file_atomic(
        storage,
        &info.deletes_file(),
        &encode_framed(DELETES_MAGIC, &payload),
    )
}

/// Read a segment's live-docs sidecar; absent means all documents live.
pub fn read_live_docs(storage: &dyn Storage, info: &SegmentInfo) -> Result<LiveDocs> {
    let name = info.deletes_file();
    if !storage.file_exists(&name) {
        return Ok(LiveDocs::all_live(info.doc_count));
    }
    let bytes = storage::read_file(storage, &name)?;
    let payload = decode_framed(DELETES_MAGIC, &bytes, &name)?;
    let repr: LiveDocsRepr =
        bincode::deserialize(payload).map_err(|e| YariError::serialization(e.to_string()))?;
    Ok(LiveDocs::from_repr(repr))
}

/// Delete a segment's files, ignoring ones that are already gone.
pub fn delete_segment_files(storage: &dyn Storage, info: &SegmentInfo) -> Result<()> {
    for name in [info.data_file(), info.deletes_file()] {
        if storage.file_exists(&name) {
            storage.delete_file(&name)?;
        }
    }
    Ok(())
}
