//! Prefix and wildcard queries.

use regex::Regex;

use crate::error::{Result, YariError};
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::query::{CancellationToken, Query, constant_score_matcher};

/// Matches documents containing any term starting with the prefix.
///
/// Expansion walks the field's sorted term dictionary; each matching
/// document scores the boost once (constant score).
#[derive(Debug, Clone)]
pub struct PrefixQuery {
    field: String,
    prefix: String,
    boost: f32,
}

impl PrefixQuery {
    /// Create a prefix query.
    pub fn new(field: &str, prefix: &str) -> Self {
        PrefixQuery {
            field: field.to_string(),
            prefix: prefix.to_string(),
            boost: 1.0,
        }
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Query for PrefixQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let mut matched = Vec::new();
        for term in reader.field_terms(&self.field) {
            cancel.check()?;
            if term.starts_with(&self.prefix) {
                matched.push(term);
            } else if term.as_str() > self.prefix.as_str() && !matched.is_empty() {
                // Sorted dictionary: past the prefix range, nothing more
                // can match.
                break;
            }
        }
        Ok(constant_score_matcher(
            reader,
            &self.field,
            &matched,
            self.boost,
        ))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn description(&self) -> String {
        format!("{}:{}*", self.field, self.prefix)
    }
}

/// Matches terms against a pattern with `*` (any run) and `?` (any single
/// character) wildcards.
///
/// The pattern is compiled to an anchored regex once per matcher build and
/// run over the field's term dictionary. Constant score, like all
/// multi-term queries.
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    boost: f32,
}

impl WildcardQuery {
    /// Create a wildcard query.
    pub fn new(field: &str, pattern: &str) -> Self {
        WildcardQuery {
            field: field.to_string(),
            pattern: pattern.to_string(),
            boost: 1.0,
        }
    }

    /// The queried field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compile the wildcard pattern to an anchored regex. A backslash
    /// escapes the following character, turning `*` and `?` into literals.
    fn compile(&self) -> Result<Regex> {
        let mut regex = String::with_capacity(self.pattern.len() + 8);
        regex.push('^');
        let mut chars = self.pattern.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        regex.push_str(&regex::escape(&escaped.to_string()));
                    }
                }
                other => regex.push_str(&regex::escape(&other.to_string())),
            }
        }
        regex.push('$');
        Regex::new(&regex)
            .map_err(|e| YariError::query(format!("Invalid wildcard pattern: {e}")))
    }

    /// The literal run before the first unescaped wildcard character.
    /// Escaped characters count as literals. Bounds the dictionary scan:
    /// only terms starting with this prefix can match the pattern.
    fn literal_prefix(&self) -> String {
        let mut prefix = String::new();
        let mut chars = self.pattern.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '*' | '?' => break,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        prefix.push(escaped);
                    }
                }
                other => prefix.push(other),
            }
        }
        prefix
    }
}

impl Query for WildcardQuery {
    fn matcher(
        &self,
        reader: &IndexReader,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Matcher>> {
        let regex = self.compile()?;
        let prefix = self.literal_prefix();
        let mut matched = Vec::new();
        for term in reader.field_terms(&self.field) {
            cancel.check()?;
            if !term.starts_with(&prefix) {
                // Sorted dictionary: stop once past the literal-prefix
                // range, skip terms before it.
                if term.as_str() > prefix.as_str() {
                    break;
                }
                continue;
            }
            if regex.is_match(&term) {
                matched.push(term);
            }
        }
        Ok(constant_score_matcher(
            reader,
            &self.field,
            &matched,
            self.boost,
        ))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.pattern)
    }
}
