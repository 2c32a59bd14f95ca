//! Match-all query.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{Matcher, ScoredDocsMatcher};
use crate::query::query::{CancellationToken, Query};

/// Matches every live document with a constant score.
#[derive(Debug, Clone)]
pub struct MatchAllQuery {
    boost: f32,
}

impl MatchAllQuery {
    /// Create a match-all query.
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for MatchAllQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let docs = reader
            .live_doc_ids()
            .into_iter()
            .map(|id| (id, self.boost))
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
        "*:*".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::index::{Index, IndexConfig};

    #[test]
    fn test_matches_only_live_docs() {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        writer
            .add_document(Document::builder().add_text("body", "target doc").build())
            .unwrap();
        writer
            .add_document(Document::builder().add_text("body", "other doc").build())
            .unwrap();
        writer.commit().unwrap();
        writer.delete_documents("body", "target").unwrap();
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        let mut matcher = MatchAllQuery::new()
            .matcher(&reader, &CancellationToken::new())
            .unwrap();

        assert_eq!(matcher.doc_id(), 1);
        matcher.next().unwrap();
        assert!(matcher.is_exhausted());
    }
}
