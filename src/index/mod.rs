//! Index construction, persistence, and reading.

pub mod index;
pub mod merge;
pub mod posting;
pub mod reader;
pub mod segment;
pub mod writer;

pub use index::{Index, IndexConfig, Manifest};
pub use posting::{Posting, PostingList};
pub use reader::{IndexReader, SegmentReader};
pub use segment::{LiveDocs, SegmentData, SegmentInfo};
pub use writer::IndexWriter;

/// Index-wide document identifier: segment base offset plus local id.
pub type DocId = u64;
