//! Composable tokenizer + filter chain.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::TokenFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// An analyzer built from one tokenizer and an ordered list of filters.
///
/// Filters run in the order they were added; each consumes the previous
/// stage's stream. Order matters: stemming before lowercasing, or stopping
/// after synonym expansion, produce different terms.
///
/// # Examples
///
/// ```
/// use yari::analysis::analyzer::{Analyzer, PipelineAnalyzer};
/// use yari::analysis::tokenizer::WhitespaceTokenizer;
/// use yari::analysis::token_filter::{LowercaseFilter, StopFilter};
///
/// let analyzer = PipelineAnalyzer::new(WhitespaceTokenizer::new())
///     .add_filter(LowercaseFilter::new())
///     .add_filter(StopFilter::new());
///
/// let tokens: Vec<_> = analyzer.analyze("The Quick Fox").unwrap().collect();
/// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, vec!["quick", "fox"]);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn TokenFilter>>,
}

impl PipelineAnalyzer {
    /// Create a pipeline with the given tokenizer and no filters.
    pub fn new<T: Tokenizer + 'static>(tokenizer: T) -> Self {
        PipelineAnalyzer {
            tokenizer: Arc::new(tokenizer),
            filters: Vec::new(),
        }
    }

    /// Append a filter to the end of the chain.
    pub fn add_filter<F: TokenFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append an already-shared filter to the end of the chain.
    pub fn add_shared_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// The names of the chain's stages, tokenizer first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.tokenizer.name()];
        names.extend(self.filters.iter().map(|f| f.name()));
        names
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut stream = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            stream = filter.filter(stream)?;
        }
        Ok(stream)
    }

    fn analyze_query(&self, text: &str) -> Result<TokenStream> {
        let mut stream = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            if filter.index_time_only() {
                continue;
            }
            stream = filter.filter(stream)?;
        }
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}
