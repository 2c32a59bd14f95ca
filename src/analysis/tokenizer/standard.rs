//! Standard tokenizer based on Unicode word boundaries.

use unicode_segmentation::UnicodeSegmentation;

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
///
/// Words that consist solely of punctuation or symbols are discarded, so
/// `"kitty@cat.com, hi!"` tokenizes to `kitty`, `cat.com`, `hi`.
#[derive(Clone, Debug, Default)]
pub struct StandardTokenizer;

impl StandardTokenizer {
    /// Create a new standard tokenizer.
    pub fn new() -> Self {
        StandardTokenizer
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = text
            .unicode_word_indices()
            .enumerate()
            .map(|(position, (offset, word))| {
                Token::with_offsets(word, position, offset, offset + word.len())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
