//! Token filter implementations for token transformation.

use std::fmt::Debug;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait TokenFilter: Send + Sync + Debug {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Whether this filter runs only when documents are indexed.
    ///
    /// Query-side analysis skips index-only stages, so an expansion like
    /// synonym rewriting enriches the index without also rewriting the
    /// user's query terms. A one-directional rule A -> B must not make a
    /// query for A match documents that only ever contained B.
    fn index_time_only(&self) -> bool {
        false
    }
}

// Individual filter modules
pub mod dedup;
pub mod lowercase;
pub mod stem;
pub mod stop;
pub mod synonym;

// Re-export all filters for convenient access
pub use dedup::DedupFilter;
pub use lowercase::LowercaseFilter;
pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;
pub use synonym::{SynonymFilter, SynonymMap, SynonymMapBuilder};
