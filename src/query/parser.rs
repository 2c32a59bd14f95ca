//! Text query parser.
//!
//! Turns user-typed query strings into query trees. The syntax is the
//! familiar one:
//!
//! ```text
//! fox                      term in the default field
//! title:fox                term in an explicit field
//! "quick fox"              phrase
//! "quick fox"~2            phrase with slop
//! fo*  f?x                 prefix / wildcard
//! humpty~1                 fuzzy (default distance 2 when bare ~)
//! id:[2 TO 9]              inclusive term range, * for an open end
//! +must -not a OR b        occurrence operators
//! (a OR b) AND c           grouping
//! fox^2.5                  boost
//! ```
//!
//! Plain terms and phrases are analyzed with the same per-field analyzer
//! the writer used, so query terms line up with indexed terms. Wildcards,
//! fuzzy terms, and range bounds are taken literally. Syntax errors carry
//! the byte position of the offending character and nothing is executed.

use std::sync::Arc;

use crate::analysis::analyzer::PerFieldAnalyzer;
use crate::analysis::token::Token;
use crate::error::{Result, YariError};
use crate::query::boolean::{BooleanQuery, Occur};
use crate::query::fuzzy::FuzzyQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::query::Query;
use crate::query::range::TermRangeQuery;
use crate::query::term::TermQuery;
use crate::query::wildcard::{PrefixQuery, WildcardQuery};

/// Parser for the textual query syntax.
#[derive(Debug, Clone)]
pub struct QueryParser {
    default_field: String,
    analyzer: Arc<PerFieldAnalyzer>,
}

impl QueryParser {
    /// Create a parser with a default field and the index's analyzer.
    pub fn new(default_field: &str, analyzer: Arc<PerFieldAnalyzer>) -> Self {
        QueryParser {
            default_field: default_field.to_string(),
            analyzer,
        }
    }

    /// Parse a query string into a query tree.
    pub fn parse(&self, input: &str) -> Result<Box<dyn Query>> {
        let mut state = ParseState {
            src: input,
            pos: 0,
            parser: self,
        };
        state.skip_ws();
        if state.at_end() {
            return Err(YariError::parse(0, "Empty query"));
        }
        let query = state.parse_boolean()?;
        state.skip_ws();
        if !state.at_end() {
            return Err(YariError::parse(
                state.pos,
                format!("Unexpected character '{}'", state.peek().unwrap()),
            ));
        }
        Ok(query)
    }

    /// Analyze a bare term through the query-side chain, returning its
    /// searchable-form tokens.
    fn analyze_term(&self, field: &str, text: &str) -> Result<Vec<Token>> {
        Ok(self
            .analyzer
            .analyze_field_query(field, text)?
            .filter(|t| !t.is_stopped())
            .collect())
    }
}

struct ParseState<'a> {
    src: &'a str,
    pos: usize,
    parser: &'a QueryParser,
}

/// Characters that end a bare word.
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '(' | ')' | '^' | '"' | '[' | ']')
}

impl<'a> ParseState<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume a keyword (followed by a word boundary) if present.
    fn eat_keyword(&mut self, kw: &str) -> bool {
        let rest = &self.src[self.pos..];
        if rest.starts_with(kw) {
            let after = &rest[kw.len()..];
            if after.is_empty() || after.chars().next().is_some_and(is_word_boundary) {
                self.pos += kw.len();
                return true;
            }
        }
        false
    }

    /// Read characters until a word boundary.
    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| !is_word_boundary(c)) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn parse_boolean(&mut self) -> Result<Box<dyn Query>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        let mut pending_and = false;

        loop {
            self.skip_ws();
            if self.at_end() || self.peek() == Some(')') {
                break;
            }

            if self.eat_keyword("AND") {
                if clauses.is_empty() {
                    return Err(YariError::parse(self.pos - 3, "AND needs a left operand"));
                }
                pending_and = true;
                continue;
            }
            if self.eat_keyword("OR") {
                if clauses.is_empty() {
                    return Err(YariError::parse(self.pos - 2, "OR needs a left operand"));
                }
                continue;
            }

            let mut occur = Occur::Should;
            if self.eat_keyword("NOT") {
                occur = Occur::MustNot;
                self.skip_ws();
            } else if self.peek() == Some('+') {
                self.bump();
                occur = Occur::Must;
            } else if self.peek() == Some('-') {
                self.bump();
                occur = Occur::MustNot;
            }

            let clause_pos = self.pos;
            let query = self.parse_atom()?;

            if pending_and {
                pending_and = false;
                // AND promotes both operands to required clauses.
                if let Some(last) = clauses.last_mut() {
                    if last.0 == Occur::Should {
                        last.0 = Occur::Must;
                    }
                }
                if occur == Occur::Should {
                    occur = Occur::Must;
                }
            }

            match query {
                Some(q) => clauses.push((occur, q)),
                // Terms fully removed by analysis (all stop words) drop
                // out of the tree; a required clause doing so is a
                // contradiction worth reporting.
                None if occur == Occur::Must => {
                    return Err(YariError::parse(
                        clause_pos,
                        "Required clause was removed entirely by analysis",
                    ));
                }
                None => {}
            }
        }

        if pending_and {
            return Err(YariError::parse(self.pos, "AND needs a right operand"));
        }

        if clauses.is_empty() {
            return Err(YariError::parse(self.pos, "Query has no effective clauses"));
        }
        if clauses.len() == 1 && clauses[0].0 == Occur::Should {
            let (_, query) = clauses.remove(0);
            return Ok(query);
        }
        let mut builder = BooleanQuery::builder();
        for (occur, query) in clauses {
            builder = builder.add_boxed(query, occur);
        }
        Ok(Box::new(builder.build()))
    }

    fn parse_atom(&mut self) -> Result<Option<Box<dyn Query>>> {
        if self.peek() == Some('(') {
            self.bump();
            let inner = self.parse_boolean()?;
            self.skip_ws();
            if self.peek() != Some(')') {
                return Err(YariError::parse(self.pos, "Expected ')'"));
            }
            self.bump();
            let inner = self.apply_boost(inner)?;
            return Ok(Some(inner));
        }

        // Optional field prefix.
        let word_pos = self.pos;
        let mut field = self.parser.default_field.clone();
        let mut word = if self.peek() == Some('"') || self.peek() == Some('[') {
            ""
        } else {
            self.read_word()
        };

        if self.peek() == Some(':') {
            if word.is_empty() {
                return Err(YariError::parse(word_pos, "Expected a field name"));
            }
            self.bump();
            field = word.to_string();
            word = "";
        }

        let query: Box<dyn Query> = match self.peek() {
            Some('"') if word.is_empty() => match self.parse_phrase(&field)? {
                Some(q) => q,
                None => return Ok(None),
            },
            Some('[') if word.is_empty() => self.parse_range(&field)?,
            _ => {
                if word.is_empty() {
                    word = self.read_word();
                }
                if word.is_empty() {
                    return Err(YariError::parse(self.pos, "Expected a term"));
                }
                match self.make_term_query(&field, word, word_pos)? {
                    Some(q) => q,
                    None => return Ok(None),
                }
            }
        };

        Ok(Some(self.apply_boost(query)?))
    }

    /// A bare word becomes a fuzzy, wildcard, prefix, or analyzed term
    /// query.
    fn make_term_query(
        &mut self,
        field: &str,
        word: &str,
        word_pos: usize,
    ) -> Result<Option<Box<dyn Query>>> {
        // Fuzzy suffix: term~ or term~N.
        if let Some(base) = word.strip_suffix('~') {
            if base.is_empty() {
                return Err(YariError::parse(word_pos, "Fuzzy operator needs a term"));
            }
            return Ok(Some(Box::new(FuzzyQuery::new(field, base))));
        }
        if let Some(tilde) = word.rfind('~') {
            let (base, edits) = word.split_at(tilde);
            let edits: u32 = edits[1..].parse().map_err(|_| {
                YariError::parse(word_pos + tilde + 1, "Invalid fuzzy edit distance")
            })?;
            return Ok(Some(Box::new(FuzzyQuery::with_max_edits(
                field, base, edits,
            ))));
        }

        if word.contains('?') || word.contains('*') {
            // A lone trailing star is a plain prefix scan. Anything with an
            // escape goes through the full wildcard compiler.
            let inner_stars = word[..word.len() - 1].contains('*');
            if word.ends_with('*') && !inner_stars && !word.contains('?') && !word.contains('\\') {
                let prefix = &word[..word.len() - 1];
                return Ok(Some(Box::new(PrefixQuery::new(field, prefix))));
            }
            return Ok(Some(Box::new(WildcardQuery::new(field, word))));
        }

        let tokens = self.parser.analyze_term(field, word)?;
        Ok(match tokens.len() {
            0 => None,
            1 => Some(Box::new(TermQuery::new(field, &tokens[0].text))),
            _ => {
                let terms: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
                Some(Box::new(PhraseQuery::new(field, &terms)))
            }
        })
    }

    fn parse_phrase(&mut self, field: &str) -> Result<Option<Box<dyn Query>>> {
        let open_pos = self.pos;
        self.bump(); // opening quote
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '"') {
            self.bump();
        }
        if self.at_end() {
            return Err(YariError::parse(open_pos, "Unterminated phrase"));
        }
        let text = &self.src[start..self.pos];
        self.bump(); // closing quote

        // Optional slop suffix.
        let mut slop = 0u32;
        if self.peek() == Some('~') {
            self.bump();
            let digits_pos = self.pos;
            let digits = self.read_word();
            slop = digits
                .parse()
                .map_err(|_| YariError::parse(digits_pos, "Invalid phrase slop"))?;
        }

        let tokens = self.parser.analyze_term(field, text)?;
        Ok(match tokens.len() {
            0 => None,
            1 => Some(Box::new(TermQuery::new(field, &tokens[0].text))),
            _ => {
                let terms: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
                Some(Box::new(PhraseQuery::new(field, &terms).with_slop(slop)))
            }
        })
    }

    fn parse_range(&mut self, field: &str) -> Result<Box<dyn Query>> {
        let open_pos = self.pos;
        self.bump(); // '['
        self.skip_ws();
        let lower = self.read_word().to_string();
        self.skip_ws();
        if !self.eat_keyword("TO") {
            return Err(YariError::parse(self.pos, "Expected 'TO' in range"));
        }
        self.skip_ws();
        let upper = self.read_word().to_string();
        self.skip_ws();
        if self.peek() != Some(']') {
            return Err(YariError::parse(open_pos, "Unterminated range"));
        }
        self.bump();

        let lower = (lower != "*" && !lower.is_empty()).then_some(lower);
        let upper = (upper != "*" && !upper.is_empty()).then_some(upper);
        Ok(Box::new(TermRangeQuery::new(
            field,
            lower.as_deref(),
            upper.as_deref(),
        )))
    }

    fn apply_boost(&mut self, mut query: Box<dyn Query>) -> Result<Box<dyn Query>> {
        if self.peek() == Some('^') {
            self.bump();
            let digits_pos = self.pos;
            let digits = self.read_word();
            let boost: f32 = digits
                .parse()
                .map_err(|_| YariError::parse(digits_pos, "Invalid boost value"))?;
            query.set_boost(boost);
        }
        Ok(query)
    }
}
