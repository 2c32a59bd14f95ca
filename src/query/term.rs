//! Single-term queries.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher, ScoredDocsMatcher};
use crate::query::query::{CancellationToken, Query};
use crate::query::scorer::Bm25Scorer;

/// Matches documents whose field contains the exact term.
///
/// The term is compared against indexed terms as-is; it must already be in
/// the analyzed form (the query parser takes care of that for text typed by
/// users).
///
/// # Examples
///
/// ```
/// use yari::query::TermQuery;
///
/// let query = TermQuery::new("body", "fox");
/// assert_eq!(query.field(), "body");
/// ```
#[derive(Debug, Clone)]
pub struct TermQuery {
    field: String,
    term: String,
    boost: f32,
}

impl TermQuery {
    /// Create a term query.
    pub fn new(field: &str, term: &str) -> Self {
        TermQuery {
            field: field.to_string(),
            term: term.to_string(),
            boost: 1.0,
        }
    }

    /// Create a term query with a boost.
    pub fn with_boost(field: &str, term: &str, boost: f32) -> Self {
        TermQuery {
            field: field.to_string(),
            term: term.to_string(),
            boost,
        }
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The queried term.
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl Query for TermQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let postings = reader.postings(&self.field, &self.term);
        if postings.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let scorer = Bm25Scorer::new(reader, &self.field, postings.len() as u64);
        let docs = postings
            .into_iter()
            .map(|p| {
                let len = reader.field_length(&self.field, p.doc_id);
                (p.doc_id, self.boost * scorer.score(p.freq, len))
            })
            .collect();
        Ok(Box::new(ScoredDocsMatcher::new(docs)))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.term)
    }
}
