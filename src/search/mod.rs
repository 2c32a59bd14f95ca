//! Search execution: collection, sorting, and facet counting.

pub mod collector;
pub mod facet;
pub mod searcher;

pub use collector::TopScoreCollector;
pub use facet::{FacetCollector, FacetCount};
pub use searcher::{Hit, SearchRequest, Searcher, Sort, SortField, TopDocs};
