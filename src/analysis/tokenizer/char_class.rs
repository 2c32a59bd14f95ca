//! Character-class tokenizer with a configurable token-character predicate.

use std::fmt;
use std::sync::Arc;

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text by a per-character predicate.
///
/// Every maximal run of characters for which the predicate returns `true`
/// becomes one token; all other characters act as separators. This is the
/// building block for unusual field conventions, e.g. treating a specific
/// letter as a delimiter:
///
/// ```
/// use yari::analysis::tokenizer::{CharClassTokenizer, Tokenizer};
///
/// // Break tokens on the letter 'e'.
/// let tokenizer = CharClassTokenizer::new(|c| c != 'e');
/// let tokens: Vec<_> = tokenizer.tokenize("13e12exoxoe45e66").unwrap().collect();
///
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, vec!["13", "12", "xoxo", "45", "66"]);
/// ```
#[derive(Clone)]
pub struct CharClassTokenizer {
    is_token_char: Arc<dyn Fn(char) -> bool + Send + Sync>,
}

impl CharClassTokenizer {
    /// Create a new tokenizer from an "is this character part of a token"
    /// predicate.
    pub fn new<F>(is_token_char: F) -> Self
    where
        F: Fn(char) -> bool + Send + Sync + 'static,
    {
        CharClassTokenizer {
            is_token_char: Arc::new(is_token_char),
        }
    }

    /// Create a tokenizer that excludes the given characters from tokens.
    pub fn excluding(chars: &str) -> Self {
        let excluded: Vec<char> = chars.chars().collect();
        Self::new(move |c| !excluded.contains(&c))
    }
}

impl fmt::Debug for CharClassTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharClassTokenizer").finish()
    }
}

impl Tokenizer for CharClassTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;
        let mut start = None;

        for (i, ch) in text.char_indices() {
            if (self.is_token_char)(ch) {
                if start.is_none() {
                    start = Some(i);
                }
            } else if let Some(s) = start.take() {
                tokens.push(Token::with_offsets(&text[s..i], position, s, i));
                position += 1;
            }
        }

        if let Some(s) = start {
            tokens.push(Token::with_offsets(&text[s..], position, s, text.len()));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "char_class"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluding_character() {
        let tokenizer = CharClassTokenizer::excluding("e");
        let tokens: Vec<Token> = tokenizer.tokenize("13e12exoxoe45e66").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["13", "12", "xoxo", "45", "66"]);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_offsets_skip_separators() {
        let tokenizer = CharClassTokenizer::excluding("e");
        let tokens: Vec<Token> = tokenizer.tokenize("abecd").unwrap().collect();

        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 2);
        assert_eq!(tokens[1].start_offset, 3);
        assert_eq!(tokens[1].end_offset, 5);
    }

    #[test]
    fn test_custom_predicate() {
        let tokenizer = CharClassTokenizer::new(|c| c.is_ascii_digit());
        let tokens: Vec<Token> = tokenizer.tokenize("a1b22c333").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "22", "333"]);
    }
}
