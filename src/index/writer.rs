//! The single index writer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::analysis::analyzer::PerFieldAnalyzer;
use crate::document::{Document, FieldValue};
use crate::error::{Result, YariError};
use crate::index::DocId;
use crate::index::index::Manifest;
use crate::index::merge;
use crate::index::posting::PostingList;
use crate::index::reader::IndexReader;
use crate::index::segment::{self, LiveDocs, SegmentData, SegmentInfo};
use crate::query::query::{CancellationToken, Query};
use crate::storage::Storage;

/// Builds one segment in memory from added documents.
#[derive(Debug, Default)]
struct SegmentBuilder {
    doc_count: u32,
    terms: BTreeMap<String, BTreeMap<String, PostingList>>,
    field_lengths: BTreeMap<String, Vec<u32>>,
    stored: Vec<Document>,
    numeric_doc_values: BTreeMap<String, Vec<Option<f64>>>,
    sorted_doc_values: BTreeMap<String, Vec<Option<String>>>,
    facet_doc_values: BTreeMap<String, Vec<Vec<String>>>,
    deleted: Vec<u32>,
}

/// Pad a per-document column up to (but not including) `doc_id`, then push
/// the document's value.
fn push_at<T: Default + Clone>(col: &mut Vec<T>, doc_id: u32, value: T) {
    col.resize(doc_id as usize, T::default());
    col.push(value);
}

impl SegmentBuilder {
    fn add(&mut self, analyzer: &PerFieldAnalyzer, doc: &Document) -> Result<u32> {
        let doc_id = self.doc_count;
        let mut stored = Document::new();

        for (field, values) in doc.fields() {
            // Positions keep increasing across values of a multi-valued
            // field so phrases cannot straddle the value boundary
            // accidentally (the +1 gap breaks adjacency).
            let mut position_base = 0u32;
            let mut token_count = 0u32;

            for value in values {
                match value {
                    FieldValue::Text {
                        value: text,
                        stored: is_stored,
                        positions,
                    } => {
                        let mut last_position = None;
                        for token in analyzer.analyze_field(field, text)? {
                            if token.is_stopped() {
                                continue;
                            }
                            let abs = position_base + token.position as u32;
                            let list = self
                                .terms
                                .entry(field.to_string())
                                .or_default()
                                .entry(token.text.clone())
                                .or_default();
                            list.add_occurrence(doc_id, positions.then_some(abs));
                            token_count += 1;
                            last_position = Some(abs);
                        }
                        if let Some(last) = last_position {
                            position_base = last + 2;
                        }
                        if *is_stored {
                            stored.add_field(field, value.clone());
                        }
                    }
                    FieldValue::StoredOnly(_) => {
                        stored.add_field(field, value.clone());
                    }
                    FieldValue::NumericDocValue(n) => {
                        push_at(
                            self.numeric_doc_values.entry(field.to_string()).or_default(),
                            doc_id,
                            Some(*n),
                        );
                    }
                    FieldValue::SortedDocValue(s) => {
                        push_at(
                            self.sorted_doc_values.entry(field.to_string()).or_default(),
                            doc_id,
                            Some(s.clone()),
                        );
                    }
                    FieldValue::FacetValue(v) => {
                        let col = self.facet_doc_values.entry(field.to_string()).or_default();
                        if col.len() <= doc_id as usize {
                            col.resize(doc_id as usize + 1, Vec::new());
                        }
                        col[doc_id as usize].push(v.clone());
                    }
                }
            }

            if token_count > 0 {
                push_at(
                    self.field_lengths.entry(field.to_string()).or_default(),
                    doc_id,
                    token_count,
                );
            }
        }

        self.stored.push(stored);
        self.doc_count += 1;
        Ok(doc_id)
    }

    /// Delete buffered documents below `watermark` that contain the exact
    /// term. Documents added after the delete was issued are untouched.
    fn delete_matching(&mut self, field: &str, term: &str, watermark: u32) {
        if let Some(list) = self.terms.get(field).and_then(|t| t.get(term)) {
            for posting in &list.postings {
                if posting.doc_id < watermark && !self.deleted.contains(&posting.doc_id) {
                    self.deleted.push(posting.doc_id);
                }
            }
        }
    }

    fn finalize(mut self) -> (SegmentData, LiveDocs) {
        let doc_count = self.doc_count;
        for col in self.field_lengths.values_mut() {
            col.resize(doc_count as usize, 0);
        }
        for col in self.numeric_doc_values.values_mut() {
            col.resize(doc_count as usize, None);
        }
        for col in self.sorted_doc_values.values_mut() {
            col.resize(doc_count as usize, None);
        }
        for col in self.facet_doc_values.values_mut() {
            col.resize(doc_count as usize, Vec::new());
        }

        let mut live = LiveDocs::all_live(doc_count);
        for doc_id in &self.deleted {
            live.delete(*doc_id);
        }

        let data = SegmentData {
            doc_count,
            terms: self.terms,
            field_lengths: self.field_lengths,
            stored: self.stored,
            numeric_doc_values: self.numeric_doc_values,
            sorted_doc_values: self.sorted_doc_values,
            facet_doc_values: self.facet_doc_values,
        };
        (data, live)
    }
}

#[derive(Debug)]
struct PendingDelete {
    field: String,
    term: String,
}

/// Adds, deletes, and updates documents, publishing them with `commit`.
///
/// Nothing a writer does is visible to readers until `commit` swaps in a
/// new manifest. Dropping the writer without committing discards all
/// buffered changes. Only one writer per [`crate::index::Index`] handle
/// exists at a time.
#[derive(Debug)]
pub struct IndexWriter {
    storage: Arc<dyn Storage>,
    analyzer: Arc<PerFieldAnalyzer>,
    manifest: Manifest,
    builder: SegmentBuilder,
    pending_deletes: Vec<PendingDelete>,
    pending_doc_deletes: Vec<DocId>,
    writer_active: Arc<AtomicBool>,
}

impl IndexWriter {
    pub(crate) fn new(
        storage: Arc<dyn Storage>,
        analyzer: Arc<PerFieldAnalyzer>,
        manifest: Manifest,
        writer_active: Arc<AtomicBool>,
    ) -> Self {
        IndexWriter {
            storage,
            analyzer,
            manifest,
            builder: SegmentBuilder::default(),
            pending_deletes: Vec::new(),
            pending_doc_deletes: Vec::new(),
            writer_active,
        }
    }

    /// Buffer a document for indexing. Analysis happens here, so malformed
    /// input is reported at add time rather than at commit.
    pub fn add_document(&mut self, doc: Document) -> Result<()> {
        if doc.is_empty() {
            return Err(YariError::index("Cannot index an empty document"));
        }
        self.builder.add(self.analyzer.as_ref(), &doc)?;
        Ok(())
    }

    /// Mark every document containing the exact term for deletion. The term
    /// is matched literally against indexed terms; it is not analyzed.
    pub fn delete_documents(&mut self, field: &str, term: &str) -> Result<()> {
        let watermark = self.builder.doc_count;
        self.builder.delete_matching(field, term, watermark);
        self.pending_deletes.push(PendingDelete {
            field: field.to_string(),
            term: term.to_string(),
        });
        Ok(())
    }

    /// Mark every committed document matching `query` for deletion and
    /// return how many were affected. Buffered documents are not matched:
    /// they have no postings to query yet. The deletions become visible at
    /// the next commit.
    pub fn delete_documents_matching(&mut self, query: &dyn Query) -> Result<u64> {
        let reader = IndexReader::open(self.storage.as_ref(), &self.manifest)?;
        let cancel = CancellationToken::new();
        let mut matcher = query.matcher(&reader, &cancel)?;
        let mut count = 0u64;
        while !matcher.is_exhausted() {
            self.pending_doc_deletes.push(matcher.doc_id());
            count += 1;
            matcher.next()?;
        }
        Ok(count)
    }

    /// Replace every document containing the exact term with the given
    /// document. The old documents disappear entirely; fields absent from
    /// the new document are not carried over.
    pub fn update_document(&mut self, field: &str, term: &str, doc: Document) -> Result<()> {
        self.delete_documents(field, term)?;
        self.add_document(doc)
    }

    /// Number of documents buffered since the last commit.
    pub fn buffered_docs(&self) -> u32 {
        self.builder.doc_count
    }

    /// Publish all buffered changes as a new commit point.
    ///
    /// Buffered documents become a new immutable segment; pending deletes
    /// are applied to the live-docs sidecars of existing segments. The
    /// manifest swap is last, so a failure anywhere earlier leaves the
    /// previous commit point intact.
    pub fn commit(&mut self) -> Result<()> {
        if self.builder.doc_count == 0
            && self.pending_deletes.is_empty()
            && self.pending_doc_deletes.is_empty()
        {
            return Ok(());
        }

        self.apply_deletes_to_segments()?;

        let builder = std::mem::take(&mut self.builder);
        if builder.doc_count > 0 {
            let info = SegmentInfo {
                id: Uuid::new_v4().to_string(),
                doc_count: builder.doc_count,
            };
            let (data, live) = builder.finalize();
            segment::write_segment(self.storage.as_ref(), &info, &data)?;
            if live.has_deletions() {
                segment::write_live_docs(self.storage.as_ref(), &info, &live)?;
            }
            self.manifest.segments.push(info);
        }

        self.pending_deletes.clear();
        self.pending_doc_deletes.clear();
        self.manifest.generation += 1;
        self.manifest.save(self.storage.as_ref())
    }

    /// Merge all committed segments into one, dropping deleted documents.
    ///
    /// Buffered changes are committed first. The merged segment is written
    /// in full before the manifest swap; old segment files are removed only
    /// after the swap succeeds.
    pub fn merge_all(&mut self) -> Result<()> {
        self.commit()?;
        if self.manifest.segments.len() <= 1 {
            let only_has_deletes = self
                .manifest
                .segments
                .first()
                .map(|info| {
                    segment::read_live_docs(self.storage.as_ref(), info)
                        .map(|l| l.has_deletions())
                })
                .transpose()?
                .unwrap_or(false);
            if !only_has_deletes {
                return Ok(());
            }
        }

        let old_segments = self.manifest.segments.clone();
        let merged = merge::merge_segments(self.storage.as_ref(), &old_segments)?;

        self.manifest.segments = merged.into_iter().collect();
        self.manifest.generation += 1;
        self.manifest.save(self.storage.as_ref())?;

        // Old files are garbage once the new manifest is durable.
        for info in &old_segments {
            segment::delete_segment_files(self.storage.as_ref(), info)?;
        }
        Ok(())
    }

    /// Commit and release the writer.
    pub fn close(mut self) -> Result<()> {
        self.commit()
    }

    fn apply_deletes_to_segments(&mut self) -> Result<()> {
        if self.pending_deletes.is_empty() && self.pending_doc_deletes.is_empty() {
            return Ok(());
        }

        let mut base: DocId = 0;
        for info in &self.manifest.segments {
            let data = segment::read_segment(self.storage.as_ref(), info)?;
            let mut live = segment::read_live_docs(self.storage.as_ref(), info)?;
            let mut changed = false;

            for delete in &self.pending_deletes {
                if let Some(list) = data.postings(&delete.field, &delete.term) {
                    for posting in &list.postings {
                        changed |= live.delete(posting.doc_id);
                    }
                }
            }

            let end = base + DocId::from(info.doc_count);
            for &doc_id in &self.pending_doc_deletes {
                if doc_id >= base && doc_id < end {
                    changed |= live.delete((doc_id - base) as u32);
                }
            }
            base = end;

            if changed {
                segment::write_live_docs(self.storage.as_ref(), info, &live)?;
            }
        }
        Ok(())
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        self.writer_active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index::{Index, IndexConfig};
    use crate::index::segment::read_live_docs;

    fn doc(body: &str, email: &str) -> Document {
        Document::builder()
            .add_text("body", body)
            .add_text("email", email)
            .build()
    }

    fn keyword_index() -> Index {
        use crate::analysis::analyzer::{KeywordAnalyzer, PerFieldAnalyzer, StandardAnalyzer};
        let analyzer = PerFieldAnalyzer::new(StandardAnalyzer::new())
            .with_field("email", KeywordAnalyzer::new());
        Index::in_memory(IndexConfig {
            analyzer: Arc::new(analyzer),
        })
        .unwrap()
    }

    #[test]
    fn test_commit_creates_segment() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("quick brown fox", "a@x.com")).unwrap();
        writer.add_document(doc("lazy dog", "b@x.com")).unwrap();
        writer.commit().unwrap();

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        assert_eq!(manifest.segments.len(), 1);
        assert_eq!(manifest.segments[0].doc_count, 2);
        assert_eq!(manifest.generation, 1);
    }

    #[test]
    fn test_uncommitted_docs_are_invisible() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("quick", "a@x.com")).unwrap();
        drop(writer);

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        assert!(manifest.segments.is_empty());
    }

    #[test]
    fn test_delete_marks_committed_docs() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("quick", "a@x.com")).unwrap();
        writer.add_document(doc("lazy", "b@x.com")).unwrap();
        writer.commit().unwrap();

        writer.delete_documents("email", "a@x.com").unwrap();
        writer.commit().unwrap();

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        let live = read_live_docs(index.storage().as_ref(), &manifest.segments[0]).unwrap();
        assert_eq!(live.live_count(), 1);
        assert!(!live.is_live(0));
    }

    #[test]
    fn test_delete_only_affects_earlier_buffered_docs() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("first", "same@x.com")).unwrap();
        writer.delete_documents("email", "same@x.com").unwrap();
        writer.add_document(doc("second", "same@x.com")).unwrap();
        writer.commit().unwrap();

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        let live = read_live_docs(index.storage().as_ref(), &manifest.segments[0]).unwrap();
        assert!(!live.is_live(0));
        assert!(live.is_live(1));
    }

    #[test]
    fn test_delete_by_query_counts_and_applies() {
        use crate::query::TermQuery;

        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("quick fox", "a@x.com")).unwrap();
        writer.add_document(doc("lazy dog", "b@x.com")).unwrap();
        writer.add_document(doc("quick dog", "c@x.com")).unwrap();
        writer.commit().unwrap();

        let query = TermQuery::new("body", "quick");
        assert_eq!(writer.delete_documents_matching(&query).unwrap(), 2);
        // Already-deleted docs are not visible to a second delete.
        writer.commit().unwrap();
        assert_eq!(writer.delete_documents_matching(&query).unwrap(), 0);

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        let live = read_live_docs(index.storage().as_ref(), &manifest.segments[0]).unwrap();
        assert_eq!(live.live_count(), 1);
        assert!(live.is_live(1));
    }

    #[test]
    fn test_delete_term_is_not_analyzed() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        writer.add_document(doc("quick", "Kitty@X.com")).unwrap();
        writer.commit().unwrap();

        // Exact term match: different case does not match keyword terms.
        writer.delete_documents("email", "kitty@x.com").unwrap();
        writer.commit().unwrap();

        let manifest = Manifest::load(index.storage().as_ref()).unwrap();
        let live = read_live_docs(index.storage().as_ref(), &manifest.segments[0]).unwrap();
        assert_eq!(live.live_count(), 1);
    }

    #[test]
    fn test_empty_document_rejected() {
        let index = keyword_index();
        let mut writer = index.writer().unwrap();
        assert!(writer.add_document(Document::new()).is_err());
    }
}
