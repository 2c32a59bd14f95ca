//! Postings: per-term document and position data.

use serde::{Deserialize, Serialize};

/// One document's entry in a posting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Segment-local document id.
    pub doc_id: u32,
    /// Number of occurrences of the term in this document's field.
    pub freq: u32,
    /// Absolute token positions, ascending. Empty when the field was
    /// indexed without positions.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting with positions; the frequency is their count.
    pub fn with_positions(doc_id: u32, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            freq: positions.len() as u32,
            positions,
        }
    }
}

/// The documents containing one term in one field, ordered by doc id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    /// Create an empty posting list.
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    /// Total occurrences of the term across all documents.
    pub fn total_term_freq(&self) -> u64 {
        self.postings.iter().map(|p| u64::from(p.freq)).sum()
    }

    /// Append an occurrence of the term in `doc_id` at `position`.
    ///
    /// Doc ids must arrive in non-decreasing order; consecutive calls for
    /// the same document accumulate into one posting.
    pub fn add_occurrence(&mut self, doc_id: u32, position: Option<u32>) {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => {
                last.freq += 1;
                if let Some(pos) = position {
                    last.positions.push(pos);
                }
            }
            _ => {
                debug_assert!(self.postings.last().is_none_or(|p| p.doc_id < doc_id));
                self.postings.push(Posting {
                    doc_id,
                    freq: 1,
                    positions: position.into_iter().collect(),
                });
            }
        }
    }
}
