//! Fuzzy term queries.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::query::{CancellationToken, Query, constant_score_matcher};

/// Largest supported edit distance.
pub const MAX_SUPPORTED_EDITS: u32 = 2;

/// Matches terms within a bounded Levenshtein distance of the given term.
///
/// Expansion scans the field's term dictionary with a length pre-filter;
/// matching documents get the constant boost score.
#[derive(Debug, Clone)]
pub struct FuzzyQuery {
    field: String,
    term: String,
    max_edits: u32,
    boost: f32,
}

impl FuzzyQuery {
    /// Create a fuzzy query with the default edit distance of 2.
    pub fn new(field: &str, term: &str) -> Self {
        Self::with_max_edits(field, term, MAX_SUPPORTED_EDITS)
    }

    /// Create a fuzzy query with an explicit edit distance, clamped to
    /// [`MAX_SUPPORTED_EDITS`].
    pub fn with_max_edits(field: &str, term: &str, max_edits: u32) -> Self {
        FuzzyQuery {
            field: field.to_string(),
            term: term.to_string(),
            max_edits: max_edits.min(MAX_SUPPORTED_EDITS),
            boost: 1.0,
        }
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The base term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The maximum edit distance.
    pub fn max_edits(&self) -> u32 {
        self.max_edits
    }
}

/// Levenshtein distance bounded by `max`: returns `None` when the distance
/// exceeds the bound, allowing early abandonment row by row.
fn bounded_levenshtein(a: &str, b: &str, max: u32) -> Option<u32> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max as usize {
        return None;
    }

    let mut prev: Vec<u32> = (0..=b.len() as u32).collect();
    let mut curr = vec![0u32; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i as u32 + 1;
        let mut row_min = curr[0];
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (prev[b.len()] <= max).then_some(prev[b.len()])
}

impl Query for FuzzyQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let mut matched = Vec::new();
        for term in reader.field_terms(&self.field) {
            cancel.check()?;
            if bounded_levenshtein(&self.term, &term, self.max_edits).is_some() {
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
        format!("{}:{}~{}", self.field, self.term, self.max_edits)
    }
}
