//! Term range queries.

use std::ops::Bound;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::query::{CancellationToken, Query, constant_score_matcher};

/// Matches documents containing any term within a lexicographic range.
///
/// Bounds are compared as strings against the term dictionary. Constant
/// score, like the other multi-term queries.
#[derive(Debug, Clone)]
pub struct TermRangeQuery {
    field: String,
    lower: Bound<String>,
    upper: Bound<String>,
    boost: f32,
}

impl TermRangeQuery {
    /// Inclusive range on both ends. `None` leaves the end open.
    pub fn new(field: &str, lower: Option<&str>, upper: Option<&str>) -> Self {
        TermRangeQuery {
            field: field.to_string(),
            lower: lower.map_or(Bound::Unbounded, |s| Bound::Included(s.to_string())),
            upper: upper.map_or(Bound::Unbounded, |s| Bound::Included(s.to_string())),
            boost: 1.0,
        }
    }

    /// Range with explicit bounds.
    pub fn with_bounds(field: &str, lower: Bound<String>, upper: Bound<String>) -> Self {
        TermRangeQuery {
            field: field.to_string(),
            lower,
            upper,
            boost: 1.0,
        }
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    fn contains(&self, term: &str) -> bool {
        let above_lower = match &self.lower {
            Bound::Included(l) => term >= l.as_str(),
            Bound::Excluded(l) => term > l.as_str(),
            Bound::Unbounded => true,
        };
        let below_upper = match &self.upper {
            Bound::Included(u) => term <= u.as_str(),
            Bound::Excluded(u) => term < u.as_str(),
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }

    fn past_upper(&self, term: &str) -> bool {
        match &self.upper {
            Bound::Included(u) => term > u.as_str(),
            Bound::Excluded(u) => term >= u.as_str(),
            Bound::Unbounded => false,
        }
    }
}

impl Query for TermRangeQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let mut matched = Vec::new();
        for term in reader.field_terms(&self.field) {
            cancel.check()?;
            if self.past_upper(&term) {
                break;
            }
            if self.contains(&term) {
                matched.push(term);
            }
        }
        Ok(constant_score_matcher(
            reader,
            &self.field,
            &matched,
            self.boost,
        ))
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
        let lower = match &self.lower {
            Bound::Included(l) | Bound::Excluded(l) => l.as_str(),
            Bound::Unbounded => "*",
        };
        let upper = match &self.upper {
            Bound::Included(u) | Bound::Excluded(u) => u.as_str(),
            Bound::Unbounded => "*",
        };
        format!("{}:[{} TO {}]", self.field, lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::index::{Index, IndexConfig};

    fn reader_for(bodies: &[&str]) -> IndexReader {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        for body in bodies {
            writer
                .add_document(Document::builder().add_text("body", body).build())
                .unwrap();
        }
        writer.commit().unwrap();
        index.reader().unwrap()
    }

    fn docs_of(query: &TermRangeQuery, reader: &IndexReader) -> Vec<u64> {
        let mut matcher = query.matcher(reader, &CancellationToken::new()).unwrap();
        let mut out = Vec::new();
        while !matcher.is_exhausted() {
            out.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        out
    }

    #[test]
    fn test_inclusive_range() {
        let reader = reader_for(&["apple", "banana", "cherry", "date"]);
        let query = TermRangeQuery::new("body", Some("banana"), Some("cherry"));
        assert_eq!(docs_of(&query, &reader), vec![1, 2]);
    }

    #[test]
    fn test_exclusive_bounds() {
        let reader = reader_for(&["apple", "banana", "cherry"]);
        let query = TermRangeQuery::with_bounds(
            "body",
            Bound::Excluded("apple".to_string()),
            Bound::Excluded("cherry".to_string()),
        );
        assert_eq!(docs_of(&query, &reader), vec![1]);
    }

    #[test]
    fn test_open_ended_range() {
        let reader = reader_for(&["apple", "banana", "cherry"]);
        let query = TermRangeQuery::new("body", Some("banana"), None);
        assert_eq!(docs_of(&query, &reader), vec![1, 2]);

        let lower_open = TermRangeQuery::new("body", None, Some("banana"));
        assert_eq!(docs_of(&lower_open, &reader), vec![0, 1]);
    }

    #[test]
    fn test_empty_range_matches_nothing() {
        let reader = reader_for(&["apple"]);
        let query = TermRangeQuery::new("body", Some("x"), Some("z"));
        assert!(docs_of(&query, &reader).is_empty());
    }
}
