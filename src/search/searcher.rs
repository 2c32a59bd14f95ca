//! Query execution against a reader snapshot.

use std::cmp::Ordering;

use crate::document::Document;
use crate::error::Result;
use crate::index::DocId;
use crate::index::reader::IndexReader;
use crate::query::query::{CancellationToken, Query};
use crate::search::collector::TopScoreCollector;

/// How results are ordered.
#[derive(Debug, Clone, Default)]
pub enum Sort {
    /// Descending relevance score, ties by ascending doc id.
    #[default]
    Relevance,
    /// One or more doc-value sort fields, applied in order.
    Fields(Vec<SortField>),
    /// Ascending doc id (the order documents were indexed in).
    IndexOrder,
}

/// Whether a sort field compares numeric or string doc values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKind {
    Numeric,
    String,
}

/// One sort criterion over a doc-values field.
///
/// Documents without a value for the field sort after all documents that
/// have one, regardless of direction.
#[derive(Debug, Clone)]
pub struct SortField {
    field: String,
    kind: SortKind,
    descending: bool,
}

impl SortField {
    /// Sort by a string doc-values field, ascending.
    pub fn string(field: &str) -> Self {
        SortField {
            field: field.to_string(),
            kind: SortKind::String,
            descending: false,
        }
    }

    /// Sort by a numeric doc-values field, ascending.
    pub fn numeric(field: &str) -> Self {
        SortField {
            field: field.to_string(),
            kind: SortKind::Numeric,
            descending: false,
        }
    }

    /// Reverse the direction.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    fn compare(&self, reader: &IndexReader, a: DocId, b: DocId) -> Ordering {
        let ord = match self.kind {
            SortKind::Numeric => {
                let va = reader.numeric_value(&self.field, a);
                let vb = reader.numeric_value(&self.field, b);
                match (va, vb) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            SortKind::String => {
                let va = reader.sorted_value(&self.field, a);
                let vb = reader.sorted_value(&self.field, b);
                match (va, vb) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

/// A search to run: query, result budget, ordering, cancellation.
#[derive(Debug)]
pub struct SearchRequest {
    query: Box<dyn Query>,
    limit: usize,
    sort: Sort,
    cancel: CancellationToken,
}

impl SearchRequest {
    /// A relevance-sorted request with a limit of 10.
    pub fn new<Q: Query + 'static>(query: Q) -> Self {
        Self::from_boxed(Box::new(query))
    }

    /// Build from an already-boxed query (e.g. parser output).
    pub fn from_boxed(query: Box<dyn Query>) -> Self {
        SearchRequest {
            query,
            limit: 10,
            sort: Sort::Relevance,
            cancel: CancellationToken::new(),
        }
    }

    /// Maximum number of hits to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Result ordering.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Attach a cancellation token.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// One search hit with its stored fields.
#[derive(Debug, Clone)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f32,
    pub document: Document,
}

/// The outcome of a search.
#[derive(Debug, Clone)]
pub struct TopDocs {
    /// The kept hits in requested order.
    pub hits: Vec<Hit>,
    /// Total matching documents, kept or not.
    pub total_hits: u64,
}

/// Executes queries against one reader snapshot.
#[derive(Debug, Clone)]
pub struct Searcher {
    reader: IndexReader,
}

impl Searcher {
    /// Create a searcher over a reader snapshot.
    pub fn new(reader: IndexReader) -> Self {
        Searcher { reader }
    }

    /// The underlying reader.
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Run a search and return the requested top hits.
    pub fn search(&self, request: &SearchRequest) -> Result<TopDocs> {
        let mut matcher = request.query.matcher(&self.reader, &request.cancel)?;

        match &request.sort {
            Sort::Relevance => {
                let mut collector = TopScoreCollector::new(request.limit);
                while !matcher.is_exhausted() {
                    request.cancel.check()?;
                    collector.collect(matcher.doc_id(), matcher.score());
                    matcher.next()?;
                }
                let total_hits = collector.total_hits();
                self.resolve(collector.into_sorted(), total_hits)
            }
            Sort::IndexOrder => {
                let mut hits = Vec::new();
                let mut total_hits = 0u64;
                while !matcher.is_exhausted() {
                    request.cancel.check()?;
                    if hits.len() < request.limit {
                        hits.push((matcher.doc_id(), matcher.score()));
                    }
                    total_hits += 1;
                    matcher.next()?;
                }
                self.resolve(hits, total_hits)
            }
            Sort::Fields(fields) => {
                // Doc-value sorting needs the full match set before
                // ordering; the limit applies afterwards.
                let mut matches: Vec<(DocId, f32)> = Vec::new();
                while !matcher.is_exhausted() {
                    request.cancel.check()?;
                    matches.push((matcher.doc_id(), matcher.score()));
                    matcher.next()?;
                }
                let total_hits = matches.len() as u64;

                matches.sort_by(|a, b| {
                    for field in fields {
                        let ord = field.compare(&self.reader, a.0, b.0);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    a.0.cmp(&b.0)
                });
                matches.truncate(request.limit);
                self.resolve(matches, total_hits)
            }
        }
    }

    /// Count matching documents without collecting them.
    pub fn count(&self, query: &dyn Query) -> Result<u64> {
        let cancel = CancellationToken::new();
        let mut matcher = query.matcher(&self.reader, &cancel)?;
        let mut count = 0u64;
        while !matcher.is_exhausted() {
            count += 1;
            matcher.next()?;
        }
        Ok(count)
    }

    fn resolve(&self, scored: Vec<(DocId, f32)>, total_hits: u64) -> Result<TopDocs> {
        let mut hits = Vec::with_capacity(scored.len());
        for (doc_id, score) in scored {
            hits.push(Hit {
                doc_id,
                score,
                document: self.reader.document(doc_id)?,
            });
        }
        Ok(TopDocs { hits, total_hits })
    }
}
