//! Default general-purpose analyzer.

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::StandardTokenizer;
use crate::error::Result;

/// Unicode word segmentation, lowercasing, and English stop word removal.
///
/// This is the analyzer used when nothing more specific is configured.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    pipeline: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a standard analyzer with the built-in English stop list.
    pub fn new() -> Self {
        StandardAnalyzer {
            pipeline: PipelineAnalyzer::new(StandardTokenizer::new())
                .add_filter(LowercaseFilter::new())
                .add_filter(StopFilter::new()),
        }
    }

    /// Create a standard analyzer with a custom stop list.
    pub fn with_stop_words(words: &[&str]) -> Self {
        StandardAnalyzer {
            pipeline: PipelineAnalyzer::new(StandardTokenizer::new())
                .add_filter(LowercaseFilter::new())
                .add_filter(StopFilter::from_words(words.iter().copied())),
        }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze(text)
    }

    fn analyze_query(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze_query(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
