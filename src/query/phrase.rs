//! Phrase queries over term positions.

use ahash::AHashMap;

use crate::error::{Result, YariError};
use crate::index::DocId;
use crate::index::reader::IndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher, ScoredDocsMatcher};
use crate::query::query::{CancellationToken, Query};
use crate::query::scorer::Bm25Scorer;

/// Matches documents containing the given terms in order.
///
/// With `slop` 0 the terms must be strictly consecutive. A positive slop
/// allows the terms to spread out: an alignment counts as a match when,
/// after shifting each term's position back by its offset in the phrase,
/// the positions fit in a window of width `slop`.
///
/// Phrase matching needs term positions; querying a field indexed without
/// them is an error rather than silently matching nothing.
#[derive(Debug, Clone)]
pub struct PhraseQuery {
    field: String,
    terms: Vec<String>,
    slop: u32,
    boost: f32,
}

impl PhraseQuery {
    /// Create an exact phrase query (slop 0).
    pub fn new(field: &str, terms: &[&str]) -> Self {
        PhraseQuery {
            field: field.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            slop: 0,
            boost: 1.0,
        }
    }

    /// Set the slop.
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The phrase terms in order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The slop.
    pub fn slop(&self) -> u32 {
        self.slop
    }
}

/// Count alignments whose adjusted positions fit in a window of `slop`.
///
/// `lists` holds, per phrase term, its positions shifted back by the term's
/// offset in the phrase, ascending. Classic k-pointer minimum-window scan.
fn phrase_freq(lists: &[Vec<i64>], slop: i64) -> u32 {
    debug_assert!(lists.iter().all(|l| !l.is_empty()));
    let mut idx = vec![0usize; lists.len()];
    let mut count = 0u32;

    loop {
        let mut min = i64::MAX;
        let mut max = i64::MIN;
        let mut min_k = 0;
        for (k, list) in lists.iter().enumerate() {
            let v = list[idx[k]];
            if v < min {
                min = v;
                min_k = k;
            }
            max = max.max(v);
        }

        if max - min <= slop {
            count += 1;
        }

        idx[min_k] += 1;
        if idx[min_k] == lists[min_k].len() {
            return count;
        }
    }
}

impl Query for PhraseQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        if self.terms.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        if self.terms.len() == 1 {
            return crate::query::term::TermQuery::with_boost(
                &self.field,
                &self.terms[0],
                self.boost,
            )
            .matcher(reader, _cancel);
        }

        // Candidate docs and their per-term adjusted positions.
        let mut candidates: AHashMap<DocId, Vec<Vec<i64>>> = AHashMap::new();
        for (i, term) in self.terms.iter().enumerate() {
            let postings = reader.postings(&self.field, term);
            if postings.is_empty() {
                return Ok(Box::new(EmptyMatcher::new()));
            }
            for posting in postings {
                if posting.positions.is_empty() {
                    return Err(YariError::query(format!(
                        "Field '{}' was indexed without positions; phrase queries need them",
                        self.field
                    )));
                }
                if i == 0 {
                    candidates
                        .entry(posting.doc_id)
                        .or_insert_with(|| Vec::with_capacity(self.terms.len()));
                }
                if let Some(lists) = candidates.get_mut(&posting.doc_id) {
                    if lists.len() == i {
                        lists.push(
                            posting
                                .positions
                                .iter()
                                .map(|&p| i64::from(p) - i as i64)
                                .collect(),
                        );
                    }
                }
            }
            // Drop docs the current term did not reach.
            candidates.retain(|_, lists| lists.len() == i + 1);
            if candidates.is_empty() {
                return Ok(Box::new(EmptyMatcher::new()));
            }
        }

        let mut matches: Vec<(DocId, u32)> = candidates
            .into_iter()
            .filter_map(|(doc_id, lists)| {
                let freq = phrase_freq(&lists, i64::from(self.slop));
                (freq > 0).then_some((doc_id, freq))
            })
            .collect();
        matches.sort_by_key(|&(doc_id, _)| doc_id);

        if matches.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let scorer = Bm25Scorer::new(reader, &self.field, matches.len() as u64);
        let docs = matches
            .into_iter()
            .map(|(doc_id, freq)| {
                let len = reader.field_length(&self.field, doc_id);
                (doc_id, self.boost * scorer.score(freq, len))
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
        let phrase = self.terms.join(" ");
        if self.slop > 0 {
            format!("{}:\"{}\"~{}", self.field, phrase, self.slop)
        } else {
            format!("{}:\"{}\"", self.field, phrase)
        }
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

    fn matching_docs(query: &PhraseQuery, reader: &IndexReader) -> Vec<u64> {
        let mut matcher = query.matcher(reader, &CancellationToken::new()).unwrap();
        let mut out = Vec::new();
        while !matcher.is_exhausted() {
            out.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        out
    }

    #[test]
    fn test_exact_phrase() {
        let reader = reader_for(&["quick brown fox", "brown quick fox", "quick fox"]);
        let query = PhraseQuery::new("body", &["quick", "brown"]);
        assert_eq!(matching_docs(&query, &reader), vec![0]);
    }

    #[test]
    fn test_phrase_survives_stop_word_gap() {
        // "the" is removed but leaves a position gap, so "quick fox" is
        // not adjacent in "quick the fox"... except the gap means exactly
        // one position apart after "the" is dropped.
        let reader = reader_for(&["quick and fox"]);
        let exact = PhraseQuery::new("body", &["quick", "fox"]);
        assert!(matching_docs(&exact, &reader).is_empty());

        let sloppy = PhraseQuery::new("body", &["quick", "fox"]).with_slop(1);
        assert_eq!(matching_docs(&sloppy, &reader), vec![0]);
    }

    #[test]
    fn test_slop_allows_reordering_distance() {
        let reader = reader_for(&["fox quick"]);
        let tight = PhraseQuery::new("body", &["quick", "fox"]).with_slop(1);
        assert!(matching_docs(&tight, &reader).is_empty());

        let loose = PhraseQuery::new("body", &["quick", "fox"]).with_slop(2);
        assert_eq!(matching_docs(&loose, &reader), vec![0]);
    }

    #[test]
    fn test_missing_term_matches_nothing() {
        let reader = reader_for(&["quick brown fox"]);
        let query = PhraseQuery::new("body", &["quick", "zebra"]);
        assert!(matching_docs(&query, &reader).is_empty());
    }

    #[test]
    fn test_positionless_field_is_an_error() {
        let index = Index::in_memory(IndexConfig::default()).unwrap();
        let mut writer = index.writer().unwrap();
        writer
            .add_document(
                Document::builder()
                    .add_text_no_positions("body", "quick brown fox")
                    .build(),
            )
            .unwrap();
        writer.commit().unwrap();

        let reader = index.reader().unwrap();
        let query = PhraseQuery::new("body", &["quick", "brown"]);
        assert!(matches!(
            query.matcher(&reader, &CancellationToken::new()),
            Err(YariError::Query(_))
        ));
    }

    #[test]
    fn test_single_term_phrase_degenerates_to_term() {
        let reader = reader_for(&["quick fox", "lazy dog"]);
        let query = PhraseQuery::new("body", &["fox"]);
        assert_eq!(matching_docs(&query, &reader), vec![0]);
    }
}
