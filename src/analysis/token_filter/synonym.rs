//! Synonym expansion filter.
//!
//! Synonyms are declared as a finite mapping from multi-token input phrases
//! to output token sequences. At analysis time the filter walks the token
//! stream and substitutes the longest matching input phrase (longest-match-
//! first; rules sharing the longest input all fire). Expansion is single
//! pass: output tokens are never re-expanded.
//!
//! Whether the matched input tokens survive alongside the replacement is
//! pinned by the map's `keep_original` flag. With `keep_original`, a query
//! for the original term still matches; without it, only the replacement
//! term does.
//!
//! The filter is index-time only: query-side analysis skips it, so rules
//! rewrite what gets indexed but never the user's query terms.
//!
//! # Examples
//!
//! ```
//! use yari::analysis::token_filter::{SynonymMap, TokenFilter, SynonymFilter};
//! use yari::analysis::token::Token;
//!
//! let map = SynonymMap::builder()
//!     .keep_original(false)
//!     .add_rule("green", "color")
//!     .add_rule("elephant", "animal")
//!     .build()
//!     .unwrap();
//!
//! let filter = SynonymFilter::new(map);
//! let tokens = vec![Token::new("green", 0), Token::new("elephant", 1)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert_eq!(result[0].text, "color");
//! assert_eq!(result[1].text, "animal");
//! ```

use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::TokenFilter;
use crate::error::{Result, YariError};

/// A single synonym rule: input phrase tokens mapped to output tokens.
#[derive(Debug, Clone)]
struct SynonymRule {
    input: Vec<String>,
    output: Vec<String>,
}

/// A validated, immutable set of synonym rules.
///
/// Construction fails fast on malformed rules (empty sides, cyclic
/// mappings); tokenization never has to deal with them.
#[derive(Debug, Clone)]
pub struct SynonymMap {
    rules: Vec<SynonymRule>,
    keep_original: bool,
    max_input_len: usize,
}

impl SynonymMap {
    /// Start building a synonym map.
    pub fn builder() -> SynonymMapBuilder {
        SynonymMapBuilder::new()
    }

    /// Whether matched input tokens are kept alongside the replacements.
    pub fn keep_original(&self) -> bool {
        self.keep_original
    }

    /// Number of rules in the map.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the map has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules whose input phrase matches the token texts starting at
    /// `start`, restricted to the longest matching input length.
    fn longest_matches(&self, texts: &[&str], start: usize) -> Vec<&SynonymRule> {
        let avail = texts.len() - start;
        let mut len = self.max_input_len.min(avail);

        while len > 0 {
            let matched: Vec<&SynonymRule> = self
                .rules
                .iter()
                .filter(|rule| {
                    rule.input.len() == len
                        && rule
                            .input
                            .iter()
                            .zip(&texts[start..start + len])
                            .all(|(a, b)| a == b)
                })
                .collect();

            if !matched.is_empty() {
                return matched;
            }
            len -= 1;
        }

        Vec::new()
    }
}

/// Builder for [`SynonymMap`].
#[derive(Debug, Default)]
pub struct SynonymMapBuilder {
    rules: Vec<SynonymRule>,
    keep_original: bool,
}

impl SynonymMapBuilder {
    /// Create a new builder. Originals are dropped by default.
    pub fn new() -> Self {
        SynonymMapBuilder {
            rules: Vec::new(),
            keep_original: false,
        }
    }

    /// Keep the matched input tokens alongside the replacement tokens.
    pub fn keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    /// Add a rule mapping an input phrase to an output phrase. Phrases are
    /// split on whitespace.
    pub fn add_rule(mut self, input: &str, output: &str) -> Self {
        self.rules.push(SynonymRule {
            input: input.split_whitespace().map(str::to_string).collect(),
            output: output.split_whitespace().map(str::to_string).collect(),
        });
        self
    }

    /// Add a bidirectional rule (both directions expand to each other).
    pub fn add_bidirectional_rule(self, a: &str, b: &str) -> Self {
        self.add_rule(a, b).add_rule(b, a)
    }

    /// Validate the rules and build the map.
    ///
    /// Fails with a configuration error when a rule has an empty input or
    /// output, or maps a phrase to itself. Mutually referring rules such
    /// as `a -> b, b -> a` are fine: expansion is single-pass, so outputs
    /// are never fed back through the rules.
    pub fn build(self) -> Result<SynonymMap> {
        for rule in &self.rules {
            if rule.input.is_empty() || rule.output.is_empty() {
                return Err(YariError::config(
                    "Synonym rule must have a non-empty input and output",
                ));
            }
            if rule.input == rule.output {
                return Err(YariError::config(format!(
                    "Synonym rule maps '{}' to itself",
                    rule.input.join(" ")
                )));
            }
        }

        let max_input_len = self.rules.iter().map(|r| r.input.len()).max().unwrap_or(0);

        Ok(SynonymMap {
            rules: self.rules,
            keep_original: self.keep_original,
            max_input_len,
        })
    }

}

/// A filter that expands synonyms in the token stream.
#[derive(Debug, Clone)]
pub struct SynonymFilter {
    map: Arc<SynonymMap>,
}

impl SynonymFilter {
    /// Create a new synonym filter with the given map.
    pub fn new(map: SynonymMap) -> Self {
        SynonymFilter { map: Arc::new(map) }
    }
}

impl TokenFilter for SynonymFilter {
    fn index_time_only(&self) -> bool {
        true
    }

    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let input: Vec<Token> = tokens.collect();
        let texts: Vec<&str> = input.iter().map(|t| t.text.as_str()).collect();

        let mut output: Vec<Token> = Vec::with_capacity(input.len());
        let mut i = 0;

        while i < input.len() {
            if input[i].is_stopped() {
                output.push(input[i].clone());
                i += 1;
                continue;
            }

            let matches = self.map.longest_matches(&texts, i);
            if matches.is_empty() {
                output.push(input[i].clone());
                i += 1;
                continue;
            }

            let match_len = matches[0].input.len();
            let first = &input[i];
            let last = &input[i + match_len - 1];
            let span = last.position + last.position_length - first.position;

            if self.map.keep_original() {
                output.extend(input[i..i + match_len].iter().cloned());
            }

            for rule in matches {
                if rule.output.len() == 1 {
                    // Single replacement token spans the whole input phrase.
                    output.push(
                        Token::with_offsets(
                            &rule.output[0],
                            first.position,
                            first.start_offset,
                            last.end_offset,
                        )
                        .with_position_length(span),
                    );
                } else {
                    for (k, out) in rule.output.iter().enumerate() {
                        output.push(Token::with_offsets(
                            out,
                            first.position + k,
                            first.start_offset,
                            last.end_offset,
                        ));
                    }
                }
            }

            i += match_len;
        }

        output.sort_by_key(|t| t.position);

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "synonym"
    }
}
