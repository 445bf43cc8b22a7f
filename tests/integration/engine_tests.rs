use std::collections::HashSet;
use std::sync::Arc;

use article_search::error::SearchError;
use article_search::query::QueryProcessor;
use article_search::search::engine::result_ids;
use article_search::search::{
    Document, EngineConfig, RetrievalMode, SearchEngine, SearchRequest, SortOverride,
};
use article_search::test_utils::fakes::{FixedEmbedder, MapDictionary, StaticBackend};
use article_search::test_utils::fixtures::sample_articles;

fn semantic_side() -> Vec<Document> {
    let mut docs = sample_articles();
    docs.reverse();
    docs.push(Document::new("201", 0.91).with_title("Medicaid expansion explained"));
    docs
}

fn engine(backend: StaticBackend) -> SearchEngine {
    let processor = QueryProcessor::new(Arc::new(MapDictionary::new([("helthcare", "healthcare")])));
    SearchEngine::new(
        Arc::new(backend),
        Arc::new(FixedEmbedder::new(vec![0.1, 0.2, 0.3])),
        Arc::new(processor),
        EngineConfig::default(),
    )
}

#[test]
fn rrf_end_to_end_returns_unique_ranked_results() {
    let lexical = sample_articles();
    let semantic = semantic_side();
    let engine = engine(
        StaticBackend::new()
            .with_lexical(lexical.clone())
            .with_semantic(semantic.clone()),
    );

    let request = SearchRequest::new("Healthcare Policy", RetrievalMode::HybridRrf).with_top_k(5);
    let outcome = engine.search(&request).unwrap();

    assert!(outcome.results.len() <= 5);
    let ids = result_ids(&outcome.results);
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");

    for pair in outcome.results.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores not descending");
    }

    let known: HashSet<String> = lexical.iter().chain(&semantic).map(|d| d.id.clone()).collect();
    assert!(ids.iter().all(|id| known.contains(*id)));
    assert_eq!(outcome.processed.text, "healthcare policy");
}

#[test]
fn every_mode_succeeds_against_healthy_backend() {
    let engine = engine(
        StaticBackend::new()
            .with_lexical(sample_articles())
            .with_semantic(semantic_side()),
    );

    for mode in RetrievalMode::ALL {
        let outcome = engine
            .search(&SearchRequest::new("helthcare", mode).with_top_k(3))
            .unwrap();
        assert_eq!(outcome.mode, mode);
        assert!(outcome.results.len() <= 3, "{mode} returned too many");
        assert!(outcome.processed.was_corrected);
    }
}

#[test]
fn date_sort_keeps_membership_and_orders_by_date() {
    let engine = engine(StaticBackend::new().with_lexical(sample_articles()));
    let relevance = engine
        .search(&SearchRequest::new("policy", RetrievalMode::Lexical))
        .unwrap();
    let by_date = engine
        .search(&SearchRequest::new("policy", RetrievalMode::Lexical).with_sort(SortOverride::DateDesc))
        .unwrap();

    let mut a = result_ids(&relevance.results);
    let mut b = result_ids(&by_date.results);
    assert_eq!(result_ids(&by_date.results), vec!["102", "101", "105", "103", "104"]);
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}

#[test]
fn empty_backend_is_a_successful_empty_outcome() {
    let engine = engine(StaticBackend::new());
    let outcome = engine
        .search(&SearchRequest::new("obscure topic", RetrievalMode::HybridRrf))
        .unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.total_matches, 0);
}

#[test]
fn one_failed_rrf_side_fails_the_request() {
    let engine = engine(
        StaticBackend::new()
            .with_lexical(sample_articles())
            .failing_semantic(),
    );
    let err = engine
        .search(&SearchRequest::new("policy", RetrievalMode::HybridRrf))
        .unwrap_err();
    assert_eq!(err.code(), "fusion_input_mismatch");
}

#[test]
fn failed_lexical_rrf_side_names_the_lexical_side() {
    let engine = engine(
        StaticBackend::new()
            .with_semantic(semantic_side())
            .failing_lexical(),
    );
    let err = engine
        .search(&SearchRequest::new("policy", RetrievalMode::HybridRrf))
        .unwrap_err();
    assert!(
        matches!(err, SearchError::FusionInputMismatch { failed: "lexical", .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn both_rrf_sides_failing_surfaces_the_lexical_error() {
    let engine = engine(StaticBackend::new().failing_lexical().failing_semantic());
    let err = engine
        .search(&SearchRequest::new("policy", RetrievalMode::HybridRrf))
        .unwrap_err();
    match err {
        SearchError::BackendUnavailable(reason) => assert_eq!(reason, "lexical shard failed"),
        other => panic!("unexpected error: {other:?}"),
    }
}
