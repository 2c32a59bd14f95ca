//! Top-K collection by score.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::DocId;

/// A scored candidate in the collector's heap.
///
/// Ordering is "worse first" so the heap root is always the weakest kept
/// hit: lower score is worse, and between equal scores the larger doc id is
/// worse (ties resolve to ascending doc id in the results).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    score: f32,
    doc_id: DocId,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the K best-scoring documents while counting every match.
#[derive(Debug)]
pub struct TopScoreCollector {
    limit: usize,
    heap: BinaryHeap<Candidate>,
    total_hits: u64,
}

impl TopScoreCollector {
    /// Create a collector keeping the top `limit` documents.
    pub fn new(limit: usize) -> Self {
        TopScoreCollector {
            limit,
            heap: BinaryHeap::with_capacity(limit + 1),
            total_hits: 0,
        }
    }

    /// Offer one matching document.
    pub fn collect(&mut self, doc_id: DocId, score: f32) {
        self.total_hits += 1;
        if self.limit == 0 {
            return;
        }
        self.heap.push(Candidate { score, doc_id });
        if self.heap.len() > self.limit {
            self.heap.pop();
        }
    }

    /// All matches seen, kept or not.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// The kept hits, best first; ties by ascending doc id.
    pub fn into_sorted(self) -> Vec<(DocId, f32)> {
        let mut hits: Vec<Candidate> = self.heap.into_vec();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits.into_iter().map(|c| (c.doc_id, c.score)).collect()
    }
}
