//! Analyzers turn field text into token streams.

pub mod keyword;
pub mod per_field;
pub mod pipeline;
pub mod standard;
pub mod stemming;

pub use keyword::KeywordAnalyzer;
pub use per_field::PerFieldAnalyzer;
pub use pipeline::PipelineAnalyzer;
pub use standard::StandardAnalyzer;
pub use stemming::StemmingAnalyzer;

use std::fmt::Debug;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for text analysis: tokenize text and run it through filters.
pub trait Analyzer: Send + Sync + Debug {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Analyze query text and return a stream of tokens.
    ///
    /// Index-time-only stages (synonym expansion) are skipped here, so
    /// a one-directional rule enriches the index without rewriting the
    /// user's query terms. The default runs the full chain.
    fn analyze_query(&self, text: &str) -> Result<TokenStream> {
        self.analyze(text)
    }

    /// Get the name of this analyzer.
    fn name(&self) -> &'static str;
}
