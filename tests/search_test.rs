//! End-to-end search tests across the full query surface: the parser,
//! every query type, sorting, and facet counting.

use std::sync::Arc;

use yari::analysis::analyzer::{KeywordAnalyzer, PerFieldAnalyzer, StandardAnalyzer};
use yari::document::Document;
use yari::index::{Index, IndexConfig};
use yari::query::{
    BooleanQuery, FuzzyQuery, MatchAllQuery, PhraseQuery, PrefixQuery, QueryParser, TermQuery,
};
use yari::search::{FacetCollector, FacetCount, SearchRequest, Searcher, Sort, SortField};

fn analyzer() -> Arc<PerFieldAnalyzer> {
    Arc::new(
        PerFieldAnalyzer::new(StandardAnalyzer::new())
            .with_field("email", KeywordAnalyzer::new()),
    )
}

/// Four people, two cities, string and numeric sort columns.
fn people_index() -> Index {
    let index = Index::in_memory(IndexConfig {
        analyzer: analyzer(),
    })
    .unwrap();

    let mut writer = index.writer().unwrap();
    let rows = [
        ("Tom Hanks", "tom@gmail.com", "quick brown fox jumps over the lazy dog", "Bangalore", "9", 9.0),
        ("Kitty Smith", "kitty@gmail.com", "humpty dumpty sat on a wall", "Metz", "2", 2.0),
        ("Anna Brown", "anna@gmail.com", "quick silver fox in the snow", "Bangalore", "5", 5.0),
        ("Omar Wall", "omar@gmail.com", "the dog barks at the humble bee", "Metz", "7", 7.0),
    ];
    for (name, email, body, city, id, rank) in rows {
        writer
            .add_document(
                Document::builder()
                    .add_text("name", name)
                    .add_text("email", email)
                    .add_text("body", body)
                    .add_facet("city", city)
                    .add_sorted_value("id_sort", id)
                    .add_numeric_value("rank", rank)
                    .build(),
            )
            .unwrap();
    }
    writer.close().unwrap();
    index
}

fn names(searcher: &Searcher, request: &SearchRequest) -> Vec<String> {
    searcher
        .search(request)
        .unwrap()
        .hits
        .iter()
        .map(|h| h.document.get_stored("name").unwrap().to_string())
        .collect()
}

#[test]
fn test_term_query_ranks_by_relevance() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());

    let top = searcher
        .search(&SearchRequest::new(TermQuery::new("body", "fox")))
        .unwrap();
    assert_eq!(top.total_hits, 2);
    // Scores descend; ties would fall back to ascending doc id.
    assert!(top.hits[0].score >= top.hits[1].score);
}

#[test]
fn test_phrase_and_slop() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());
    let parser = QueryParser::new("body", analyzer());

    let exact = parser.parse("\"humpty dumpty\"").unwrap();
    assert_eq!(
        names(&searcher, &SearchRequest::from_boxed(exact)),
        vec!["Kitty Smith"]
    );

    // "quick brown fox": "quick fox" needs slop over the skipped word.
    let tight = parser.parse("\"quick fox\"").unwrap();
    assert_eq!(searcher.search(&SearchRequest::from_boxed(tight)).unwrap().total_hits, 0);

    let sloppy = parser.parse("\"quick fox\"~1").unwrap();
    assert_eq!(searcher.search(&SearchRequest::from_boxed(sloppy)).unwrap().total_hits, 2);
}

#[test]
fn test_prefix_wildcard_fuzzy_range() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());
    let parser = QueryParser::new("body", analyzer());

    // hum* matches humpty and humble.
    let prefix = parser.parse("hum*").unwrap();
    let mut hit_names = names(&searcher, &SearchRequest::from_boxed(prefix));
    hit_names.sort();
    assert_eq!(hit_names, vec!["Kitty Smith", "Omar Wall"]);

    // d?g matches "dog" in two documents.
    let wildcard = parser.parse("d?g").unwrap();
    assert_eq!(
        searcher.search(&SearchRequest::from_boxed(wildcard)).unwrap().total_hits,
        2
    );

    // numpty is one edit from humpty.
    let fuzzy = parser.parse("numpty~1").unwrap();
    assert_eq!(
        names(&searcher, &SearchRequest::from_boxed(fuzzy)),
        vec!["Kitty Smith"]
    );

    // Lexicographic term range over body terms.
    let range = parser.parse("body:[bark TO cat]").unwrap();
    let mut hit_names = names(&searcher, &SearchRequest::from_boxed(range).limit(10));
    hit_names.sort();
    // "barks" and "bee" in one document, "brown" in another.
    assert_eq!(hit_names, vec!["Omar Wall", "Tom Hanks"]);
}

#[test]
fn test_boolean_queries() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());
    let parser = QueryParser::new("body", analyzer());

    let and = parser.parse("quick AND snow").unwrap();
    assert_eq!(
        names(&searcher, &SearchRequest::from_boxed(and)),
        vec!["Anna Brown"]
    );

    let or = parser.parse("snow OR wall").unwrap();
    assert_eq!(
        searcher.search(&SearchRequest::from_boxed(or)).unwrap().total_hits,
        2
    );

    let not = parser.parse("fox -snow").unwrap();
    assert_eq!(
        names(&searcher, &SearchRequest::from_boxed(not)),
        vec!["Tom Hanks"]
    );

    // Pure negation matches the complement of the live documents.
    let pure_not = parser.parse("-fox").unwrap();
    assert_eq!(
        searcher.search(&SearchRequest::from_boxed(pure_not)).unwrap().total_hits,
        2
    );
}

#[test]
fn test_boost_changes_ranking() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());

    let unboosted = BooleanQuery::builder()
        .should(TermQuery::new("body", "snow"))
        .should(TermQuery::new("body", "wall"))
        .build();
    let boosted = BooleanQuery::builder()
        .should(TermQuery::new("body", "snow"))
        .should(TermQuery::with_boost("body", "wall", 10.0))
        .build();

    let first_unboosted = names(&searcher, &SearchRequest::new(unboosted));
    let first_boosted = names(&searcher, &SearchRequest::new(boosted));
    assert_eq!(first_boosted[0], "Kitty Smith");
    assert!(first_unboosted.contains(&"Kitty Smith".to_string()));
}

#[test]
fn test_sort_by_string_doc_values() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());

    let asc = SearchRequest::new(TermQuery::new("body", "fox"))
        .sort(Sort::Fields(vec![SortField::string("id_sort")]));
    let ids: Vec<String> = searcher
        .search(&asc)
        .unwrap()
        .hits
        .iter()
        .map(|h| h.document.get_stored("name").unwrap().to_string())
        .collect();
    // id_sort "5" (Anna) before "9" (Tom).
    assert_eq!(ids, vec!["Anna Brown", "Tom Hanks"]);

    let desc = SearchRequest::new(TermQuery::new("body", "fox"))
        .sort(Sort::Fields(vec![SortField::string("id_sort").descending()]));
    let ids: Vec<String> = searcher
        .search(&desc)
        .unwrap()
        .hits
        .iter()
        .map(|h| h.document.get_stored("name").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["Tom Hanks", "Anna Brown"]);
}

#[test]
fn test_sort_by_numeric_doc_values() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());

    let request = SearchRequest::new(MatchAllQuery::new())
        .sort(Sort::Fields(vec![SortField::numeric("rank")]));
    let ranks: Vec<String> = names(&searcher, &request);
    assert_eq!(
        ranks,
        vec!["Kitty Smith", "Anna Brown", "Omar Wall", "Tom Hanks"]
    );
}

#[test]
fn test_facet_counts() {
    let index = people_index();
    let reader = index.reader().unwrap();

    let counts = FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 10).unwrap();
    assert_eq!(
        counts,
        vec![
            FacetCount { value: "Bangalore".to_string(), count: 2 },
            FacetCount { value: "Metz".to_string(), count: 2 },
        ]
    );

    // Restricting the match set restricts the counts.
    let counts =
        FacetCollector::count(&reader, &TermQuery::new("body", "fox"), "city", 10).unwrap();
    assert_eq!(
        counts,
        vec![FacetCount { value: "Bangalore".to_string(), count: 2 }]
    );
}

#[test]
fn test_direct_query_types_match_parser_output() {
    let index = people_index();
    let searcher = Searcher::new(index.reader().unwrap());

    let programmatic = searcher
        .search(&SearchRequest::new(PhraseQuery::new(
            "body",
            &["humpty", "dumpty"],
        )))
        .unwrap();
    assert_eq!(programmatic.total_hits, 1);

    let prefix = searcher
        .search(&SearchRequest::new(PrefixQuery::new("body", "hum")))
        .unwrap();
    assert_eq!(prefix.total_hits, 2);

    let fuzzy = searcher
        .search(&SearchRequest::new(FuzzyQuery::with_max_edits(
            "body", "humpty", 1,
        )))
        .unwrap();
    assert_eq!(fuzzy.total_hits, 1);
}

#[test]
fn test_deleted_docs_excluded_from_search_and_facets() {
    let index = people_index();
    {
        let mut writer = index.writer().unwrap();
        writer.delete_documents("email", "tom@gmail.com").unwrap();
        writer.commit().unwrap();
    }

    let reader = index.reader().unwrap();
    let searcher = Searcher::new(reader.clone());

    let top = searcher
        .search(&SearchRequest::new(TermQuery::new("body", "fox")))
        .unwrap();
    assert_eq!(top.total_hits, 1);

    let counts = FacetCollector::count(&reader, &MatchAllQuery::new(), "city", 10).unwrap();
    assert_eq!(
        counts,
        vec![
            FacetCount { value: "Metz".to_string(), count: 2 },
            FacetCount { value: "Bangalore".to_string(), count: 1 },
        ]
    );
}
