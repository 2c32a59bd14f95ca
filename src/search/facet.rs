//! Facet counting over matching documents.

use ahash::AHashMap;

use crate::error::{Result, YariError};
use crate::index::reader::IndexReader;
use crate::query::query::{CancellationToken, Query};

/// One facet value and the number of matching documents carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Counts facet values across the documents a query matches.
///
/// Facet fields are multi-valued: a document carrying two values for the
/// field contributes to both counts. Counting a field that was never
/// indexed with facet values is a configuration error, not an empty
/// result, because the two are indistinguishable to the caller otherwise.
#[derive(Debug, Default)]
pub struct FacetCollector;

impl FacetCollector {
    /// Count the `top_k` most frequent values of `field` among the
    /// documents matching `query`. Ties are broken by ascending value.
    pub fn count(
        reader: &IndexReader,
        query: &dyn Query,
        field: &str,
        top_k: usize,
    ) -> Result<Vec<FacetCount>> {
        Self::count_with_cancel(reader, query, field, top_k, &CancellationToken::new())
    }

    /// Like [`FacetCollector::count`] but cancellable.
    pub fn count_with_cancel(
        reader: &IndexReader,
        query: &dyn Query,
        field: &str,
        top_k: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<FacetCount>> {
        if !reader.has_facet_field(field) {
            return Err(YariError::config(format!(
                "Field '{field}' has no facet values"
            )));
        }

        let mut counts: AHashMap<String, u64> = AHashMap::new();
        let mut matcher = query.matcher(reader, cancel)?;
        while !matcher.is_exhausted() {
            cancel.check()?;
            for value in reader.facet_values(field, matcher.doc_id()) {
                *counts.entry(value).or_insert(0) += 1;
            }
            matcher.next()?;
        }

        let mut out: Vec<FacetCount> = counts
            .into_iter()
            .map(|(value, count)| FacetCount { value, count })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        out.truncate(top_k);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::index::{Index, IndexConfig};
    use crate::query::all::MatchAllQuery;
    use crate::query::term::TermQuery;

    fn city_index() -> Index {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        for (name, cities) in [
            ("ann", vec!["Bangalore", "Metz"]),
            ("bob", vec!["Bangalore"]),
            ("cat", vec!["Metz"]),
            ("dan", vec!["Bangalore"]),
        ] {
            let mut builder = Document::builder().add_text("name", name);
            for city in cities {
                builder = builder.add_facet("city", city);
            }
            writer.add_document(builder.build()).unwrap();
        }
        writer.commit().unwrap();
        index
    }

    #[test]
    fn test_counts_over_all_docs() {
        let index = city_index();
        let reader = index.reader().unwrap();
        let counts =
            FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 10).unwrap();

        assert_eq!(
            counts,
            vec![
                FacetCount { value: "Bangalore".to_string(), count: 3 },
                FacetCount { value: "Metz".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_counts_respect_query_match_set() {
        let index = city_index();
        let reader = index.reader().unwrap();
        let counts =
            FacetCollector::count(&reader, &TermQuery::new("name", "ann"), "city", 10).unwrap();

        // One multi-valued doc contributes to both values.
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_ties_break_by_ascending_value() {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        for city in ["Metz", "Bangalore"] {
            writer
                .add_document(
                    Document::builder()
                        .add_text("name", "x")
                        .add_facet("city", city)
                        .build(),
                )
                .unwrap();
        }
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        let counts =
            FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 10).unwrap();
        let values: Vec<&str> = counts.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["Bangalore", "Metz"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let index = city_index();
        let reader = index.reader().unwrap();
        let counts =
            FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 1).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].value, "Bangalore");
    }

    #[test]
    fn test_non_facet_field_is_config_error() {
        let index = city_index();
        let reader = index.reader().unwrap();
        assert!(matches!(
            FacetCollector::count(&reader, &MatchAllQuery::new(), "name", 10),
            Err(YariError::Config(_))
        ));
    }

    #[test]
    fn test_deleted_docs_are_not_counted() {
        let index = city_index();
        {
            let mut writer = index.writer().unwrap();
            writer.delete_documents("name", "ann").unwrap();
            writer.commit().unwrap();
        }
        let reader = index.reader().unwrap();
        let counts =
            FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 10).unwrap();

        assert_eq!(
            counts,
            vec![
                FacetCount { value: "Bangalore".to_string(), count: 2 },
                FacetCount { value: "Metz".to_string(), count: 1 },
            ]
        );
    }
}
