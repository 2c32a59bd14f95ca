//! BM25 relevance scoring.

use crate::index::reader::IndexReader;

/// Default BM25 term-frequency saturation parameter.
pub const DEFAULT_K1: f32 = 1.2;
/// Default BM25 length-normalization parameter.
pub const DEFAULT_B: f32 = 0.75;

/// BM25 scorer for one term in one field, bound to a reader snapshot.
///
/// The inverse document frequency is fixed at construction; per-document
/// scores vary with term frequency and field length.
#[derive(Debug, Clone)]
pub struct Bm25Scorer {
    idf: f32,
    avg_field_length: f32,
    k1: f32,
    b: f32,
}

impl Bm25Scorer {
    /// Build a scorer for a term with the given document frequency.
    pub fn new(reader: &IndexReader, field: &str, doc_freq: u64) -> Self {
        let n = reader.num_docs() as f32;
        let df = doc_freq as f32;
        // Lucene's non-negative idf formulation.
        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        Bm25Scorer {
            idf,
            avg_field_length: reader.avg_field_length(field) as f32,
            k1: DEFAULT_K1,
            b: DEFAULT_B,
        }
    }

    /// The scorer's inverse document frequency component.
    pub fn idf(&self) -> f32 {
        self.idf
    }

    /// Score one document from its term frequency and field length.
    pub fn score(&self, term_freq: u32, field_length: u32) -> f32 {
        let tf = term_freq as f32;
        let norm = if self.avg_field_length > 0.0 {
            1.0 - self.b + self.b * (field_length as f32 / self.avg_field_length)
        } else {
            1.0
        };
        self.idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }
}
