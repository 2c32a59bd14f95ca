//! Standard analysis plus Porter stemming.

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LowercaseFilter, StemFilter, StopFilter};
use crate::analysis::tokenizer::StandardTokenizer;
use crate::error::Result;

/// The standard pipeline with a Porter stemming stage appended.
///
/// Inflected forms of a word reduce to one indexed term, so "running",
/// "runs", and "run" all match each other. Stems are not always words
/// ("daily" becomes "daili"), which is invisible as long as queries go
/// through the same analyzer.
#[derive(Debug, Clone)]
pub struct StemmingAnalyzer {
    pipeline: PipelineAnalyzer,
}

impl StemmingAnalyzer {
    pub fn new() -> Self {
        StemmingAnalyzer {
            pipeline: PipelineAnalyzer::new(StandardTokenizer::new())
                .add_filter(LowercaseFilter::new())
                .add_filter(StopFilter::new())
                .add_filter(StemFilter::new()),
        }
    }
}

impl Default for StemmingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StemmingAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze(text)
    }

    fn analyze_query(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze_query(text)
    }

    fn name(&self) -> &'static str {
        "stemming"
    }
}
