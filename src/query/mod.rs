//! Queries, matchers, and scoring.

pub mod all;
pub mod boolean;
pub mod fuzzy;
pub mod matcher;
pub mod parser;
pub mod phrase;
pub mod query;
pub mod range;
pub mod scorer;
pub mod term;
pub mod wildcard;

pub use all::MatchAllQuery;
pub use boolean::{BooleanQuery, BooleanQueryBuilder, Occur};
pub use fuzzy::FuzzyQuery;
pub use matcher::{Matcher, INVALID_DOC_ID};
pub use parser::QueryParser;
pub use phrase::PhraseQuery;
pub use query::{CancellationToken, Query};
pub use range::TermRangeQuery;
pub use scorer::Bm25Scorer;
pub use term::TermQuery;
pub use wildcard::{PrefixQuery, WildcardQuery};
