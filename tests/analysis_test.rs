//! Custom analyzer pipelines exercised through the whole index/search
//! stack rather than token-by-token.

use std::sync::Arc;

use yari::analysis::analyzer::{PerFieldAnalyzer, PipelineAnalyzer};
use yari::analysis::token_filter::lowercase::LowercaseFilter;
use yari::analysis::token_filter::stem::StemFilter;
use yari::analysis::token_filter::stop::StopFilter;
use yari::analysis::token_filter::synonym::{SynonymFilter, SynonymMap};
use yari::analysis::tokenizer::char_class::CharClassTokenizer;
use yari::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use yari::document::Document;
use yari::index::{Index, IndexConfig};
use yari::query::QueryParser;
use yari::search::{SearchRequest, Searcher};

fn index_with(analyzer: PerFieldAnalyzer, bodies: &[&str]) -> Index {
    let index = Index::in_memory(IndexConfig {
        analyzer: Arc::new(analyzer),
    })
    .unwrap();
    let mut writer = index.writer().unwrap();
    for (i, body) in bodies.iter().enumerate() {
        writer
            .add_document(
                Document::builder()
                    .add_stored("id", &i.to_string())
                    .add_text("body", body)
                    .build(),
            )
            .unwrap();
    }
    writer.close().unwrap();
    index
}

fn hit_count(index: &Index, query: &str) -> u64 {
    let parser = QueryParser::new("body", index.analyzer().clone());
    let searcher = Searcher::new(index.reader().unwrap());
    searcher
        .search(&SearchRequest::from_boxed(parser.parse(query).unwrap()))
        .unwrap()
        .total_hits
}

#[test]
fn test_synonym_expansion_at_index_time() {
    let map = SynonymMap::builder()
        .keep_original(true)
        .add_rule("green", "color")
        .add_rule("elephant", "animal")
        .build()
        .unwrap();
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(SynonymFilter::new(map));
    let index = index_with(
        PerFieldAnalyzer::new(body),
        &["the green elephant", "a blue whale"],
    );

    // Both the original term and its synonym find the document.
    assert_eq!(hit_count(&index, "green"), 1);
    assert_eq!(hit_count(&index, "color"), 1);
    assert_eq!(hit_count(&index, "animal"), 1);
    assert_eq!(hit_count(&index, "whale"), 1);
}

#[test]
fn test_synonym_replacement_drops_original() {
    let map = SynonymMap::builder()
        .keep_original(false)
        .add_rule("green", "color")
        .build()
        .unwrap();
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(SynonymFilter::new(map));
    let index = index_with(PerFieldAnalyzer::new(body), &["green grass"]);

    assert_eq!(hit_count(&index, "color"), 1);
    assert_eq!(hit_count(&index, "green"), 0);
    assert_eq!(hit_count(&index, "grass"), 1);
}

#[test]
fn test_bidirectional_synonyms_match_both_ways() {
    let map = SynonymMap::builder()
        .keep_original(true)
        .add_bidirectional_rule("big", "large")
        .build()
        .unwrap();
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(SynonymFilter::new(map));
    let index = index_with(
        PerFieldAnalyzer::new(body),
        &["big house", "large garden", "small shed"],
    );

    // Either spelling finds both documents.
    assert_eq!(hit_count(&index, "big"), 2);
    assert_eq!(hit_count(&index, "large"), 2);
    assert_eq!(hit_count(&index, "house"), 1);
    assert_eq!(hit_count(&index, "small"), 1);
}

#[test]
fn test_custom_stop_words_apply_to_queries_too() {
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(StopFilter::from_words(["the", "lucky"]));
    let index = index_with(
        PerFieldAnalyzer::new(body),
        &["the lucky dog", "a plain cat"],
    );

    assert_eq!(hit_count(&index, "dog"), 1);
    // "lucky" was never indexed; the parser drops it from queries as a
    // harmless optional clause.
    assert_eq!(hit_count(&index, "lucky dog"), 1);
    // A query consisting only of stop words has nothing left to match.
    let parser = QueryParser::new("body", index.analyzer().clone());
    assert!(parser.parse("lucky").is_err());
}

#[test]
fn test_char_class_tokenizer_splits_on_excluded_chars() {
    let body = PipelineAnalyzer::new(CharClassTokenizer::excluding("e"));
    let index = index_with(PerFieldAnalyzer::new(body), &["13e12exoxoe45e66"]);

    for term in ["13", "12", "xoxo", "45", "66"] {
        assert_eq!(hit_count(&index, term), 1, "term {term:?}");
    }
    // The raw string re-tokenizes to the same consecutive terms, so the
    // parser rewrites it into a matching phrase.
    assert_eq!(hit_count(&index, "13e12exoxoe45e66"), 1);
    assert_eq!(hit_count(&index, "14"), 0);
}

#[test]
fn test_stemming_matches_inflected_forms() {
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(StemFilter::new());
    let index = index_with(
        PerFieldAnalyzer::new(body),
        &["she was running daily", "he runs sometimes"],
    );

    // The query goes through the same stemmer, so any inflection of
    // "run" matches both documents.
    assert_eq!(hit_count(&index, "running"), 2);
    assert_eq!(hit_count(&index, "runs"), 2);
    assert_eq!(hit_count(&index, "run"), 2);
    // "daily" stems to "daili"; querying "day" does not reach it.
    assert_eq!(hit_count(&index, "daily"), 1);
}

#[test]
fn test_phrase_positions_survive_stop_removal() {
    let body = PipelineAnalyzer::new(WhitespaceTokenizer::new())
        .add_filter(LowercaseFilter::new())
        .add_filter(StopFilter::new());
    let index = index_with(
        PerFieldAnalyzer::new(body),
        &["quick and the fox"],
    );

    // Removed stop words leave position gaps, so the phrase needs slop.
    assert_eq!(hit_count(&index, "\"quick fox\""), 0);
    assert_eq!(hit_count(&index, "\"quick fox\"~2"), 1);
}
