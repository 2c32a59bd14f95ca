//! Tokenizer implementations for splitting text into tokens.

use std::fmt::Debug;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that split raw text into tokens.
pub trait Tokenizer: Send + Sync + Debug {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod char_class;
pub mod standard;
pub mod whitespace;
pub mod whole;

pub use char_class::CharClassTokenizer;
pub use standard::StandardTokenizer;
pub use whitespace::WhitespaceTokenizer;
pub use whole::WholeTokenizer;
