//! Snapshot readers over committed segments.

use std::sync::Arc;

use crate::document::Document;
use crate::error::{Result, YariError};
use crate::index::DocId;
use crate::index::index::Manifest;
use crate::index::segment::{self, LiveDocs, SegmentData, SegmentInfo};
use crate::storage::Storage;

/// One loaded segment plus its doc id base within the index.
#[derive(Debug, Clone)]
pub struct SegmentReader {
    info: SegmentInfo,
    base: DocId,
    data: Arc<SegmentData>,
    live: LiveDocs,
}

impl SegmentReader {
    /// Open a segment, verifying its checksums.
    pub fn open(storage: &dyn Storage, info: &SegmentInfo, base: DocId) -> Result<SegmentReader> {
        let data = segment::read_segment(storage, info)?;
        let live = segment::read_live_docs(storage, info)?;
        Ok(SegmentReader {
            info: info.clone(),
            base,
            data: Arc::new(data),
            live,
        })
    }

    /// The segment's doc id base.
    pub fn base(&self) -> DocId {
        self.base
    }

    /// Segment contents.
    pub fn data(&self) -> &SegmentData {
        &self.data
    }

    /// Liveness of a segment-local document.
    pub fn is_live(&self, local_id: u32) -> bool {
        self.live.is_live(local_id)
    }

    /// Live document count.
    pub fn live_count(&self) -> u32 {
        self.live.live_count()
    }

    /// Segment identity.
    pub fn info(&self) -> &SegmentInfo {
        &self.info
    }
}

/// A term's occurrence in one document, with index-wide doc id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPosting {
    pub doc_id: DocId,
    pub freq: u32,
    pub positions: Vec<u32>,
}

/// A point-in-time view of the whole index.
///
/// Readers load every segment named by one manifest generation and never
/// see later commits. Deleted documents are filtered out of everything the
/// reader returns.
#[derive(Debug, Clone)]
pub struct IndexReader {
    segments: Vec<SegmentReader>,
    max_doc: u64,
}

impl IndexReader {
    /// Open a reader over a manifest's segments.
    pub fn open(storage: &dyn Storage, manifest: &Manifest) -> Result<IndexReader> {
        let mut segments = Vec::with_capacity(manifest.segments.len());
        let mut base = 0u64;
        for info in &manifest.segments {
            segments.push(SegmentReader::open(storage, info, base)?);
            base += u64::from(info.doc_count);
        }
        Ok(IndexReader {
            segments,
            max_doc: base,
        })
    }

    /// The loaded segments in doc id order.
    pub fn segments(&self) -> &[SegmentReader] {
        &self.segments
    }

    /// One past the largest possible doc id (deleted docs included).
    pub fn max_doc(&self) -> u64 {
        self.max_doc
    }

    /// Number of live documents.
    pub fn num_docs(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| u64::from(s.live_count()))
            .sum()
    }

    fn segment_of(&self, doc_id: DocId) -> Option<(&SegmentReader, u32)> {
        // Segments are few; linear scan beats a binary search in practice.
        for seg in &self.segments {
            let count = u64::from(seg.data.doc_count);
            if doc_id >= seg.base && doc_id < seg.base + count {
                return Some((seg, (doc_id - seg.base) as u32));
            }
        }
        None
    }

    /// Whether the document exists and is live.
    pub fn is_live(&self, doc_id: DocId) -> bool {
        self.segment_of(doc_id)
            .is_some_and(|(seg, local)| seg.is_live(local))
    }

    /// Live postings of a term across all segments, ascending by doc id.
    pub fn postings(&self, field: &str, term: &str) -> Vec<TermPosting> {
        let mut out = Vec::new();
        for seg in &self.segments {
            if let Some(list) = seg.data.postings(field, term) {
                for posting in &list.postings {
                    if seg.is_live(posting.doc_id) {
                        out.push(TermPosting {
                            doc_id: seg.base + u64::from(posting.doc_id),
                            freq: posting.freq,
                            positions: posting.positions.clone(),
                        });
                    }
                }
            }
        }
        out
    }

    /// Number of live documents containing the term.
    pub fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.segments
            .iter()
            .map(|seg| {
                seg.data
                    .postings(field, term)
                    .map(|list| {
                        list.postings
                            .iter()
                            .filter(|p| seg.is_live(p.doc_id))
                            .count() as u64
                    })
                    .unwrap_or(0)
            })
            .sum()
    }

    /// Average indexed token count of a field, over live documents.
    pub fn avg_field_length(&self, field: &str) -> f64 {
        let total: u64 = self
            .segments
            .iter()
            .map(|seg| {
                seg.data
                    .field_lengths
                    .get(field)
                    .map(|lengths| {
                        lengths
                            .iter()
                            .enumerate()
                            .filter(|(local, _)| seg.is_live(*local as u32))
                            .map(|(_, len)| u64::from(*len))
                            .sum()
                    })
                    .unwrap_or(0)
            })
            .sum();
        let live = self.num_docs();
        if live == 0 {
            0.0
        } else {
            total as f64 / live as f64
        }
    }

    /// Indexed token count of a field in one document.
    pub fn field_length(&self, field: &str, doc_id: DocId) -> u32 {
        self.segment_of(doc_id)
            .and_then(|(seg, local)| {
                seg.data
                    .field_lengths
                    .get(field)
                    .and_then(|lens| lens.get(local as usize))
                    .copied()
            })
            .unwrap_or(0)
    }

    /// Fetch the stored projection of a live document.
    pub fn document(&self, doc_id: DocId) -> Result<Document> {
        let (seg, local) = self
            .segment_of(doc_id)
            .ok_or_else(|| YariError::not_found(format!("No document with id {doc_id}")))?;
        if !seg.is_live(local) {
            return Err(YariError::not_found(format!(
                "Document {doc_id} has been deleted"
            )));
        }
        Ok(seg.data.stored[local as usize].clone())
    }

    /// Numeric sort value of a field in one document.
    pub fn numeric_value(&self, field: &str, doc_id: DocId) -> Option<f64> {
        let (seg, local) = self.segment_of(doc_id)?;
        seg.data
            .numeric_doc_values
            .get(field)?
            .get(local as usize)
            .copied()
            .flatten()
    }

    /// String sort value of a field in one document.
    pub fn sorted_value(&self, field: &str, doc_id: DocId) -> Option<String> {
        let (seg, local) = self.segment_of(doc_id)?;
        seg.data
            .sorted_doc_values
            .get(field)?
            .get(local as usize)
            .cloned()
            .flatten()
    }

    /// Facet values of a field in one document.
    pub fn facet_values(&self, field: &str, doc_id: DocId) -> Vec<String> {
        self.segment_of(doc_id)
            .and_then(|(seg, local)| {
                seg.data
                    .facet_doc_values
                    .get(field)
                    .and_then(|col| col.get(local as usize))
                    .cloned()
            })
            .unwrap_or_default()
    }

    /// Whether any segment carries facet values for the field.
    pub fn has_facet_field(&self, field: &str) -> bool {
        self.segments
            .iter()
            .any(|s| s.data.facet_doc_values.contains_key(field))
    }

    /// All distinct terms of a field, sorted, merged across segments.
    ///
    /// Multi-term queries expand against this dictionary; callers check
    /// cancellation between terms, so the scan stays interruptible.
    pub fn field_terms(&self, field: &str) -> Vec<String> {
        let mut terms: Vec<String> = self
            .segments
            .iter()
            .filter_map(|s| s.data.terms.get(field))
            .flat_map(|dict| dict.keys().cloned())
            .collect();
        terms.sort();
        terms.dedup();
        terms
    }

    /// Doc ids of all live documents, ascending.
    pub fn live_doc_ids(&self) -> Vec<DocId> {
        let mut out = Vec::new();
        for seg in &self.segments {
            for local in 0..seg.data.doc_count {
                if seg.is_live(local) {
                    out.push(seg.base + u64::from(local));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::index::{Index, IndexConfig};

    fn indexed(bodies: &[&str]) -> Index {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        for body in bodies {
            writer
                .add_document(Document::builder().add_text("body", body).build())
                .unwrap();
        }
        writer.commit().unwrap();
        index
    }

    #[test]
    fn test_postings_are_global_and_ordered() {
        let index = indexed(&["quick fox", "lazy fox"]);
        {
            let mut writer = index.writer().unwrap();
            writer
                .add_document(Document::builder().add_text("body", "another fox").build())
                .unwrap();
            writer.commit().unwrap();
        }

        let reader = index.reader().unwrap();
        assert_eq!(reader.segments().len(), 2);

        let postings = reader.postings("body", "fox");
        let ids: Vec<u64> = postings.iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_deleted_docs_are_invisible() {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        writer
            .add_document(Document::builder().add_text("body", "quick fox").build())
            .unwrap();
        writer
            .add_document(Document::builder().add_text("body", "lazy fox").build())
            .unwrap();
        writer.commit().unwrap();
        writer.delete_documents("body", "quick").unwrap();
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        assert_eq!(reader.num_docs(), 1);
        assert_eq!(reader.postings("body", "fox").len(), 1);
        assert!(reader.document(0).is_err());
        assert!(reader.document(1).is_ok());
    }

    #[test]
    fn test_avg_field_length_ignores_deleted_docs() {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        writer
            .add_document(Document::builder().add_text("body", "one two three four").build())
            .unwrap();
        writer
            .add_document(Document::builder().add_text("body", "five six").build())
            .unwrap();
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        assert!((reader.avg_field_length("body") - 3.0).abs() < 1e-9);

        writer.delete_documents("body", "five").unwrap();
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        assert!((reader.avg_field_length("body") - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_isolation() {
        let index = indexed(&["quick fox"]);
        let reader = index.reader().unwrap();

        let mut writer = index.writer().unwrap();
        writer
            .add_document(Document::builder().add_text("body", "new doc").build())
            .unwrap();
        writer.commit().unwrap();

        // The old reader still sees the old commit point.
        assert_eq!(reader.num_docs(), 1);
        assert_eq!(index.reader().unwrap().num_docs(), 2);
    }

    #[test]
    fn test_field_terms_merged_sorted() {
        let index = indexed(&["banana apple", "cherry apple"]);
        let reader = index.reader().unwrap();
        assert_eq!(reader.field_terms("body"), vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_missing_doc_is_not_found() {
        let index = indexed(&["one"]);
        let reader = index.reader().unwrap();
        assert!(matches!(reader.document(99), Err(YariError::NotFound(_))));
    }
}
