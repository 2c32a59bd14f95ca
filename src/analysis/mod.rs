//! Text analysis pipeline: tokenizers, token filters, and analyzers.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{
    Analyzer, KeywordAnalyzer, PerFieldAnalyzer, PipelineAnalyzer, StandardAnalyzer,
    StemmingAnalyzer,
};
pub use token::{Token, TokenStream};
pub use token_filter::TokenFilter;
pub use tokenizer::Tokenizer;
