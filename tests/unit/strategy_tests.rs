use article_search::search::strategy::{StrategyInput, lexical_query};
use article_search::search::{
    QueryPlan, RetrievalMode, StrategyOptions, VectorQueryKind, WeightPair, build_plan,
};
use article_search::test_utils::{TestCase, run_table_tests};

const EMBEDDING: [f32; 4] = [0.5, -0.5, 0.25, 0.0];

fn plan(mode: RetrievalMode, embedding: Option<&[f32]>, top_k: usize) -> QueryPlan {
    let input = StrategyInput {
        text: "healthcare policy",
        embedding,
        top_k,
        weights: WeightPair::new(1.0, 3.0),
    };
    build_plan(mode, &input, &StrategyOptions::default()).expect("plan")
}

#[test]
fn request_sizes_per_mode() -> Result<(), String> {
    let cases = vec![
        TestCase::new("lexical", RetrievalMode::Lexical, vec![10usize]),
        TestCase::new("semantic", RetrievalMode::Semantic, vec![10]),
        TestCase::new("hybrid", RetrievalMode::HybridWeighted, vec![10]),
        TestCase::new("rrf overfetches both sides", RetrievalMode::HybridRrf, vec![20, 20]),
    ];
    run_table_tests(cases, |mode| match plan(mode, Some(&EMBEDDING), 10) {
        QueryPlan::Single(spec) => vec![spec.size()],
        QueryPlan::Fused { lexical, semantic } => vec![lexical.size(), semantic.size()],
    })
}

#[test]
fn lexical_body_shape() {
    let spec = lexical_query("tax reform", 5, &StrategyOptions::default());
    let body = spec.body();
    assert_eq!(body["size"], 5);
    let mm = &body["query"]["multi_match"];
    assert_eq!(mm["query"], "tax reform");
    assert_eq!(mm["type"], "best_fields");
    assert_eq!(mm["fields"][0], "title^3");
    assert_eq!(body["_source"]["excludes"][0], "embedding");
}

#[test]
fn hybrid_weights_are_normalized_into_boosts() {
    let QueryPlan::Single(spec) = plan(RetrievalMode::HybridWeighted, Some(&EMBEDDING), 10) else {
        panic!("hybrid is a single request");
    };
    let should = spec.body()["query"]["bool"]["should"].as_array().unwrap().clone();
    assert_eq!(should.len(), 2);
    assert_eq!(should[0]["multi_match"]["boost"], 0.25);
    assert_eq!(should[1]["script_score"]["boost"], 0.75);
}

#[test]
fn knn_option_changes_vector_clause() {
    let options = StrategyOptions {
        embedding_field: "vec".to_string(),
        vector_query: VectorQueryKind::Knn,
    };
    let input = StrategyInput {
        text: "storm",
        embedding: Some(&EMBEDDING),
        top_k: 3,
        weights: WeightPair::default(),
    };
    let QueryPlan::Single(spec) = build_plan(RetrievalMode::Semantic, &input, &options).unwrap()
    else {
        panic!("semantic is a single request");
    };
    assert_eq!(spec.body()["query"]["knn"]["vec"]["k"], 3);
}

#[test]
fn modes_needing_embeddings_reject_missing_vector() {
    for mode in [RetrievalMode::Semantic, RetrievalMode::HybridWeighted, RetrievalMode::HybridRrf] {
        let input = StrategyInput {
            text: "storm",
            embedding: None,
            top_k: 3,
            weights: WeightPair::default(),
        };
        let err = build_plan(mode, &input, &StrategyOptions::default()).unwrap_err();
        assert_eq!(err.code(), "invalid_parameter", "{mode}");
    }
}
