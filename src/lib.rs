//! # Yari
//!
//! A minimal inverted-index full-text search engine for Rust.
//!
//! ## Features
//!
//! - Composable text analysis pipeline (tokenizers, stop words, stemming,
//!   synonym expansion, duplicate removal)
//! - Buffered writer with immutable segments and snapshot readers
//! - Logical deletion, atomic update, and all-or-nothing segment merge
//! - Term, phrase, prefix, wildcard, fuzzy, range, and boolean queries
//! - BM25 scoring, field sorting, and facet counting over doc values
//! - Pluggable storage backends (memory, file system)

pub mod analysis;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
