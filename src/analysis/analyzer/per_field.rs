//! Field-name routing across analyzers.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Routes analysis calls to a per-field analyzer, falling back to a default.
///
/// An index typically wants identifier fields analyzed as whole keywords
/// while body fields get the full text pipeline. Both the writer and the
/// query parser must share the same instance, otherwise indexed terms and
/// query terms diverge.
///
/// # Examples
///
/// ```
/// use yari::analysis::analyzer::{Analyzer, KeywordAnalyzer, PerFieldAnalyzer, StandardAnalyzer};
///
/// let analyzer = PerFieldAnalyzer::new(StandardAnalyzer::new())
///     .with_field("email", KeywordAnalyzer::new());
///
/// let tokens: Vec<_> = analyzer
///     .analyze_field("email", "Kitty@Gmail.Com")
///     .unwrap()
///     .collect();
/// assert_eq!(tokens[0].text, "Kitty@Gmail.Com");
/// ```
#[derive(Debug, Clone)]
pub struct PerFieldAnalyzer {
    default: Arc<dyn Analyzer>,
    fields: AHashMap<String, Arc<dyn Analyzer>>,
}

impl PerFieldAnalyzer {
    /// Create a router with the given default analyzer.
    pub fn new<A: Analyzer + 'static>(default: A) -> Self {
        PerFieldAnalyzer {
            default: Arc::new(default),
            fields: AHashMap::new(),
        }
    }

    /// Assign an analyzer to a specific field.
    pub fn with_field<A: Analyzer + 'static>(mut self, field: &str, analyzer: A) -> Self {
        self.fields.insert(field.to_string(), Arc::new(analyzer));
        self
    }

    /// Assign an already-shared analyzer to a specific field.
    pub fn with_shared_field(mut self, field: &str, analyzer: Arc<dyn Analyzer>) -> Self {
        self.fields.insert(field.to_string(), analyzer);
        self
    }

    /// The analyzer that handles the given field.
    pub fn analyzer_for(&self, field: &str) -> &Arc<dyn Analyzer> {
        self.fields.get(field).unwrap_or(&self.default)
    }

    /// Analyze text as belonging to the given field.
    pub fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.analyzer_for(field).analyze(text)
    }

    /// Analyze query text as belonging to the given field, skipping
    /// index-time-only stages.
    pub fn analyze_field_query(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.analyzer_for(field).analyze_query(text)
    }
}

impl Default for PerFieldAnalyzer {
    fn default() -> Self {
        Self::new(StandardAnalyzer::new())
    }
}

impl Analyzer for PerFieldAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.default.analyze(text)
    }

    fn analyze_query(&self, text: &str) -> Result<TokenStream> {
        self.default.analyze_query(text)
    }

    fn name(&self) -> &'static str {
        "per_field"
    }
}
