//! Matchers: ordered doc id iterators with scores.
//!
//! A matcher is always positioned on a document or exhausted; construction
//! positions it on its first match. `next` and `skip_to` only move forward.
//! Compound matchers combine children without materializing their union or
//! intersection.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::DocId;

/// Sentinel doc id of an exhausted matcher.
pub const INVALID_DOC_ID: DocId = u64::MAX;

/// An ordered iterator over matching documents.
pub trait Matcher: Send + Debug {
    /// The current document, or [`INVALID_DOC_ID`] when exhausted.
    fn doc_id(&self) -> DocId;

    /// Advance to the next matching document. Returns false on exhaustion.
    fn next(&mut self) -> Result<bool>;

    /// Advance to the first matching document with id >= `target`.
    fn skip_to(&mut self, target: DocId) -> Result<bool>;

    /// Relevance score of the current document.
    fn score(&self) -> f32;

    /// Upper bound on the number of documents this matcher can produce.
    fn cost(&self) -> u64;

    /// Whether the matcher has run out of documents.
    fn is_exhausted(&self) -> bool {
        self.doc_id() == INVALID_DOC_ID
    }
}

/// Matches nothing.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> DocId {
        INVALID_DOC_ID
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn skip_to(&mut self, _target: DocId) -> Result<bool> {
        Ok(false)
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn cost(&self) -> u64 {
        0
    }
}

/// Matches a precomputed, ascending list of scored documents.
///
/// Leaf queries resolve their postings against the reader snapshot up
/// front, so their matchers reduce to a cursor over this list.
#[derive(Debug)]
pub struct ScoredDocsMatcher {
    docs: Vec<(DocId, f32)>,
    idx: usize,
}

impl ScoredDocsMatcher {
    /// Build from `(doc id, score)` pairs sorted ascending by doc id.
    pub fn new(docs: Vec<(DocId, f32)>) -> Self {
        debug_assert!(docs.windows(2).all(|w| w[0].0 < w[1].0));
        ScoredDocsMatcher { docs, idx: 0 }
    }
}

impl Matcher for ScoredDocsMatcher {
    fn doc_id(&self) -> DocId {
        self.docs.get(self.idx).map_or(INVALID_DOC_ID, |d| d.0)
    }

    fn next(&mut self) -> Result<bool> {
        if self.idx < self.docs.len() {
            self.idx += 1;
        }
        Ok(self.idx < self.docs.len())
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        let remaining = &self.docs[self.idx.min(self.docs.len())..];
        self.idx += remaining.partition_point(|d| d.0 < target);
        Ok(self.idx < self.docs.len())
    }

    fn score(&self) -> f32 {
        self.docs.get(self.idx).map_or(0.0, |d| d.1)
    }

    fn cost(&self) -> u64 {
        self.docs.len() as u64
    }
}

/// Documents matched by every child; scores are summed.
#[derive(Debug)]
pub struct ConjunctionMatcher {
    children: Vec<Box<dyn Matcher>>,
}

impl ConjunctionMatcher {
    pub fn new(mut children: Vec<Box<dyn Matcher>>) -> Result<Self> {
        // Cheapest child leads the alignment loop.
        children.sort_by_key(|c| c.cost());
        let mut matcher = ConjunctionMatcher { children };
        matcher.align(0)?;
        Ok(matcher)
    }

    /// Advance children until they all agree on a doc >= `target`.
    fn align(&mut self, target: DocId) -> Result<bool> {
        if self.children.is_empty() {
            return Ok(false);
        }

        let mut target = target;
        'outer: loop {
            for child in &mut self.children {
                if child.doc_id() < target && !child.skip_to(target)? {
                    // One child exhausted: exhaust the rest so doc_id()
                    // reports INVALID_DOC_ID.
                    for c in &mut self.children {
                        c.skip_to(INVALID_DOC_ID)?;
                    }
                    return Ok(false);
                }
                if child.doc_id() > target {
                    target = child.doc_id();
                    continue 'outer;
                }
            }
            return Ok(true);
        }
    }
}

impl Matcher for ConjunctionMatcher {
    fn doc_id(&self) -> DocId {
        self.children
            .iter()
            .map(|c| c.doc_id())
            .max()
            .unwrap_or(INVALID_DOC_ID)
    }

    fn next(&mut self) -> Result<bool> {
        let current = self.doc_id();
        if current == INVALID_DOC_ID {
            return Ok(false);
        }
        self.align(current + 1)
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.doc_id() >= target {
            return Ok(self.doc_id() != INVALID_DOC_ID);
        }
        self.align(target)
    }

    fn score(&self) -> f32 {
        self.children.iter().map(|c| c.score()).sum()
    }

    fn cost(&self) -> u64 {
        self.children.iter().map(|c| c.cost()).min().unwrap_or(0)
    }
}

/// Documents matched by at least one child; scores of the children on the
/// current document are summed.
#[derive(Debug)]
pub struct DisjunctionMatcher {
    children: Vec<Box<dyn Matcher>>,
}

impl DisjunctionMatcher {
    pub fn new(children: Vec<Box<dyn Matcher>>) -> Self {
        DisjunctionMatcher { children }
    }

    fn min_doc(&self) -> DocId {
        self.children
            .iter()
            .map(|c| c.doc_id())
            .min()
            .unwrap_or(INVALID_DOC_ID)
    }
}

impl Matcher for DisjunctionMatcher {
    fn doc_id(&self) -> DocId {
        self.min_doc()
    }

    fn next(&mut self) -> Result<bool> {
        let current = self.min_doc();
        if current == INVALID_DOC_ID {
            return Ok(false);
        }
        for child in &mut self.children {
            if child.doc_id() == current {
                child.next()?;
            }
        }
        Ok(self.min_doc() != INVALID_DOC_ID)
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        for child in &mut self.children {
            if child.doc_id() < target {
                child.skip_to(target)?;
            }
        }
        Ok(self.min_doc() != INVALID_DOC_ID)
    }

    fn score(&self) -> f32 {
        let current = self.min_doc();
        self.children
            .iter()
            .filter(|c| c.doc_id() == current)
            .map(|c| c.score())
            .sum()
    }

    fn cost(&self) -> u64 {
        self.children.iter().map(|c| c.cost()).sum()
    }
}

/// Documents of `base` that `excluded` does not match.
#[derive(Debug)]
pub struct ExclusionMatcher {
    base: Box<dyn Matcher>,
    excluded: Box<dyn Matcher>,
}

impl ExclusionMatcher {
    pub fn new(base: Box<dyn Matcher>, excluded: Box<dyn Matcher>) -> Result<Self> {
        let mut matcher = ExclusionMatcher { base, excluded };
        matcher.settle()?;
        Ok(matcher)
    }

    /// Move `base` off any excluded document.
    fn settle(&mut self) -> Result<()> {
        loop {
            let doc = self.base.doc_id();
            if doc == INVALID_DOC_ID {
                return Ok(());
            }
            if self.excluded.doc_id() < doc {
                self.excluded.skip_to(doc)?;
            }
            if self.excluded.doc_id() != doc {
                return Ok(());
            }
            self.base.next()?;
        }
    }
}

impl Matcher for ExclusionMatcher {
    fn doc_id(&self) -> DocId {
        self.base.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        self.base.next()?;
        self.settle()?;
        Ok(!self.is_exhausted())
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        self.base.skip_to(target)?;
        self.settle()?;
        Ok(!self.is_exhausted())
    }

    fn score(&self) -> f32 {
        self.base.score()
    }

    fn cost(&self) -> u64 {
        self.base.cost()
    }
}

/// Iterates the required matcher, adding the scores of any optional
/// matchers that also land on the current document.
#[derive(Debug)]
pub struct RequiredOptionalMatcher {
    required: Box<dyn Matcher>,
    optional: Vec<Box<dyn Matcher>>,
}

impl RequiredOptionalMatcher {
    pub fn new(required: Box<dyn Matcher>, optional: Vec<Box<dyn Matcher>>) -> Result<Self> {
        let mut matcher = RequiredOptionalMatcher { required, optional };
        matcher.align_optional()?;
        Ok(matcher)
    }

    fn align_optional(&mut self) -> Result<()> {
        let doc = self.required.doc_id();
        if doc == INVALID_DOC_ID {
            return Ok(());
        }
        for opt in &mut self.optional {
            if opt.doc_id() < doc {
                opt.skip_to(doc)?;
            }
        }
        Ok(())
    }
}

impl Matcher for RequiredOptionalMatcher {
    fn doc_id(&self) -> DocId {
        self.required.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        let more = self.required.next()?;
        self.align_optional()?;
        Ok(more)
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        let found = self.required.skip_to(target)?;
        self.align_optional()?;
        Ok(found)
    }

    fn score(&self) -> f32 {
        let doc = self.required.doc_id();
        self.required.score()
            + self
                .optional
                .iter()
                .filter(|o| o.doc_id() == doc)
                .map(|o| o.score())
                .sum::<f32>()
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(ids: &[u64]) -> Box<dyn Matcher> {
        Box::new(ScoredDocsMatcher::new(
            ids.iter().map(|&id| (id, 1.0)).collect(),
        ))
    }

    fn collect(mut m: Box<dyn Matcher>) -> Vec<u64> {
        let mut out = Vec::new();
        while !m.is_exhausted() {
            out.push(m.doc_id());
            m.next().unwrap();
        }
        out
    }

    #[test]
    fn test_scored_docs_skip_to() {
        let mut m = ScoredDocsMatcher::new(vec![(1, 0.5), (5, 0.7), (9, 0.9)]);
        assert_eq!(m.doc_id(), 1);
        assert!(m.skip_to(4).unwrap());
        assert_eq!(m.doc_id(), 5);
        assert!((m.score() - 0.7).abs() < f32::EPSILON);
        assert!(!m.skip_to(10).unwrap());
        assert!(m.is_exhausted());
    }

    #[test]
    fn test_conjunction_intersects() {
        let m = ConjunctionMatcher::new(vec![docs(&[1, 3, 5, 7]), docs(&[3, 4, 7, 9])]).unwrap();
        assert_eq!(collect(Box::new(m)), vec![3, 7]);
    }

    #[test]
    fn test_conjunction_with_empty_child() {
        let m =
            ConjunctionMatcher::new(vec![docs(&[1, 2]), Box::new(EmptyMatcher::new())]).unwrap();
        assert!(m.is_exhausted());
    }

    #[test]
    fn test_disjunction_unions_and_sums_scores() {
        let mut m = DisjunctionMatcher::new(vec![docs(&[1, 3]), docs(&[3, 5])]);
        assert_eq!(m.doc_id(), 1);
        m.next().unwrap();
        assert_eq!(m.doc_id(), 3);
        assert!((m.score() - 2.0).abs() < f32::EPSILON);
        m.next().unwrap();
        assert_eq!(m.doc_id(), 5);
    }

    #[test]
    fn test_exclusion() {
        let m = ExclusionMatcher::new(docs(&[1, 2, 3, 4]), docs(&[2, 4])).unwrap();
        assert_eq!(collect(Box::new(m)), vec![1, 3]);
    }

    #[test]
    fn test_required_optional_scores() {
        let mut m = RequiredOptionalMatcher::new(docs(&[2, 6]), vec![docs(&[2, 4])]).unwrap();
        assert_eq!(m.doc_id(), 2);
        assert!((m.score() - 2.0).abs() < f32::EPSILON);
        m.next().unwrap();
        assert_eq!(m.doc_id(), 6);
        assert!((m.score() - 1.0).abs() < f32::EPSILON);
    }
}
