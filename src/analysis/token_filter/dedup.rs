//! Duplicate token removal.

use ahash::AHashSet;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::TokenFilter;
use crate::error::Result;

/// Removes tokens that repeat the same text at the same position.
///
/// Synonym expansion with `keep_original` can stack identical tokens at one
/// position (e.g. a rule whose output equals a sibling rule's). This filter
/// keeps the first occurrence and drops the rest. Tokens with equal text at
/// different positions are untouched.
#[derive(Debug, Clone, Default)]
pub struct DedupFilter;

impl DedupFilter {
    /// Create a new dedup filter.
    pub fn new() -> Self {
        DedupFilter
    }
}

impl TokenFilter for DedupFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut seen: AHashSet<(usize, String)> = AHashSet::new();
        let deduped: Vec<Token> = tokens
            .filter(|token| {
                token.is_stopped() || seen.insert((token.position, token.text.clone()))
            })
            .collect();

        Ok(Box::new(deduped.into_iter()))
    }

    fn name(&self) -> &'static str {
        "dedup"
    }
}
