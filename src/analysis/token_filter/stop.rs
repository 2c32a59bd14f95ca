//! Stop word filter implementation.
//!
//! Removes common words (stop words) that typically do not contribute to
//! search relevance. A default English list is provided; fields can carry
//! their own sets. Removed tokens leave position gaps so phrase queries
//! still see the original distances.

use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::TokenFilter;
use crate::error::Result;

/// Default English stop words list.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "s", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

lazy_static! {
    static ref ENGLISH_STOP_SET: Arc<HashSet<String>> = Arc::new(
        DEFAULT_ENGLISH_STOP_WORDS
            .iter()
            .map(|s| s.to_string())
            .collect()
    );
}

/// A filter that removes stop words from the token stream.
///
/// Matching is exact; apply a [`LowercaseFilter`](super::LowercaseFilter)
/// first when the stop set is lowercase.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        StopFilter {
            stop_words: Arc::clone(&ENGLISH_STOP_SET),
        }
    }

    /// Create a stop filter from a custom word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            stop_words: Arc::new(words.into_iter().map(|w| w.into()).collect()),
        }
    }

    /// Check whether a word is in the stop set.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        let filtered_tokens: Vec<_> = tokens
            .filter(|token| token.is_stopped() || !stop_words.contains(&token.text))
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
