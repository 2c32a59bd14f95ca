//! Boolean composition of queries.

use crate::error::Result;
use crate::index::DocId;
use crate::index::reader::IndexReader;
use crate::query::matcher::{
    ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, ExclusionMatcher, Matcher,
    RequiredOptionalMatcher, ScoredDocsMatcher,
};
use crate::query::query::{CancellationToken, Query};

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match; it contributes to the score.
    Must,
    /// The clause may match; when it does, it adds to the score.
    Should,
    /// The clause must not match; it never contributes to the score.
    MustNot,
}

/// One clause of a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    pub query: Box<dyn Query>,
    pub occur: Occur,
}

/// Combines sub-queries with must / should / must-not semantics.
///
/// A document matches when it satisfies every `Must` clause, at least one
/// `Should` clause if there are no `Must` clauses, and no `MustNot` clause.
/// A query made only of `MustNot` clauses matches the complement within the
/// live documents.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    boost: f32,
}

impl BooleanQuery {
    /// Start building a boolean query.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    fn matchers_of(
        &self,
        occur: Occur,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Vec<Box<dyn Matcher>>> {
        self.clauses
            .iter()
            .filter(|c| c.occur == occur)
            .map(|c| c.query.matcher(reader, cancel))
            .collect()
    }
}

impl Query for BooleanQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let musts = self.matchers_of(Occur::Must, reader, cancel)?;
        let shoulds = self.matchers_of(Occur::Should, reader, cancel)?;
        let nots = self.matchers_of(Occur::MustNot, reader, cancel)?;

        let base: Box<dyn Matcher> = if !musts.is_empty() {
            let conjunction: Box<dyn Matcher> = Box::new(ConjunctionMatcher::new(musts)?);
            if shoulds.is_empty() {
                conjunction
            } else {
                Box::new(RequiredOptionalMatcher::new(conjunction, shoulds)?)
            }
        } else if !shoulds.is_empty() {
            Box::new(DisjunctionMatcher::new(shoulds))
        } else if !nots.is_empty() {
            // Pure negation: the universe is the set of live documents.
            let docs: Vec<(DocId, f32)> = reader
                .live_doc_ids()
                .into_iter()
                .map(|id| (id, 1.0))
                .collect();
            Box::new(ScoredDocsMatcher::new(docs))
        } else {
            return Ok(Box::new(EmptyMatcher::new()));
        };

        let matched: Box<dyn Matcher> = if nots.is_empty() {
            base
        } else {
            Box::new(ExclusionMatcher::new(
                base,
                Box::new(DisjunctionMatcher::new(nots)),
            )?)
        };

        if (self.boost - 1.0).abs() < f32::EPSILON {
            Ok(matched)
        } else {
            Ok(Box::new(BoostMatcher {
                inner: matched,
                boost: self.boost,
            }))
        }
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
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| {
                let prefix = match c.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{}{}", prefix, c.query.description())
            })
            .collect();
        format!("({})", parts.join(" "))
    }
}

/// Multiplies an inner matcher's scores by a constant.
#[derive(Debug)]
struct BoostMatcher {
    inner: Box<dyn Matcher>,
    boost: f32,
}

impl Matcher for BoostMatcher {
    fn doc_id(&self) -> DocId {
        self.inner.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        self.inner.next()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        self.inner.skip_to(target)
    }

    fn score(&self) -> f32 {
        self.boost * self.inner.score()
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }
}

/// Builder for [`BooleanQuery`].
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    clauses: Vec<BooleanClause>,
    boost: f32,
}

impl BooleanQueryBuilder {
    pub fn new() -> Self {
        BooleanQueryBuilder {
            clauses: Vec::new(),
            boost: 1.0,
        }
    }

    /// Add a clause with the given occurrence.
    pub fn add<Q: Query + 'static>(self, query: Q, occur: Occur) -> Self {
        self.add_boxed(Box::new(query), occur)
    }

    /// Add an already-boxed clause.
    pub fn add_boxed(mut self, query: Box<dyn Query>, occur: Occur) -> Self {
        self.clauses.push(BooleanClause { query, occur });
        self
    }

    /// A clause that must match.
    pub fn must<Q: Query + 'static>(self, query: Q) -> Self {
        self.add(query, Occur::Must)
    }

    /// A clause that may match.
    pub fn should<Q: Query + 'static>(self, query: Q) -> Self {
        self.add(query, Occur::Should)
    }

    /// A clause that must not match.
    pub fn must_not<Q: Query + 'static>(self, query: Q) -> Self {
        self.add(query, Occur::MustNot)
    }

    /// Set the boost of the whole boolean query.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn build(self) -> BooleanQuery {
        BooleanQuery {
            clauses: self.clauses,
            boost: self.boost,
        }
    }
}
