//! The query trait and search cancellation.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, YariError};
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;

/// Cooperative cancellation for long-running searches.
///
/// Multi-term queries scan the whole term dictionary; they check the token
/// between scan steps and abort with a cancellation error. A cancelled
/// search returns no partial results.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that is never cancelled unless `cancel` is called.
    pub fn new() -> Self {
        CancellationToken::default()
    }

    /// Request cancellation. Safe to call from another thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with a cancellation error if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(YariError::cancelled("Search was cancelled"))
        } else {
            Ok(())
        }
    }
}

/// A search query.
///
/// Queries are immutable descriptions; `matcher` binds one to a reader
/// snapshot and produces the doc id iterator that drives collection. Boost
/// multiplies every score the matcher emits.
pub trait Query: Send + Sync + Debug {
    /// Build a matcher over the given reader.
    fn matcher(&self, reader: &IndexReader, cancel: &CancellationToken)
    -> Result<Box<dyn Matcher>>;

    /// The score multiplier of this query.
    fn boost(&self) -> f32;

    /// Set the score multiplier of this query.
    fn set_boost(&mut self, boost: f32);

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Human-readable rendering, roughly in query syntax.
    fn description(&self) -> String;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Constant-score matcher over the union of several terms' postings.
///
/// Multi-term queries (prefix, wildcard, fuzzy, range) expand to many terms
/// whose per-term relevance is meaningless; each matching document scores
/// the query's boost exactly once.
pub(crate) fn constant_score_matcher(
    reader: &IndexReader,
    field: &str,
    terms: &[String],
    boost: f32,
) -> Box<dyn Matcher> {
    let mut docs: Vec<crate::index::DocId> = terms
        .iter()
        .flat_map(|term| reader.postings(field, term))
        .map(|p| p.doc_id)
        .collect();
    docs.sort_unstable();
    docs.dedup();
    Box::new(crate::query::matcher::ScoredDocsMatcher::new(
        docs.into_iter().map(|d| (d, boost)).collect(),
    ))
}
