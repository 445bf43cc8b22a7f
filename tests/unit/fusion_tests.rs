use article_search::search::{Document, RrfConfig, fuse_results};
use article_search::test_utils::{TestCase, run_table_tests};

fn list(ids: &[&str], source: &str) -> Vec<Document> {
    ids.iter()
        .map(|id| Document::new(*id, 1.0).with_title(format!("{source} {id}")))
        .collect()
}

fn fused_ids(lexical: &[&str], semantic: &[&str], top_k: usize) -> Vec<String> {
    fuse_results(
        &list(lexical, "lexical"),
        &list(semantic, "semantic"),
        &RrfConfig::default(),
        top_k,
    )
    .documents
    .into_iter()
    .map(|doc| doc.id)
    .collect()
}

#[test]
fn fused_order_table() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "shared documents lead",
            (vec!["A", "B", "C"], vec!["B", "D", "A"], 4usize),
            vec!["B", "A", "D", "C"].into_iter().map(String::from).collect::<Vec<_>>(),
        ),
        TestCase::new(
            "truncates to top_k",
            (vec!["A", "B", "C"], vec!["B", "D", "A"], 2usize),
            vec!["B".to_string(), "A".to_string()],
        ),
        TestCase::new(
            "one empty side keeps the other order",
            (vec![], vec!["X", "Y"], 5usize),
            vec!["X".to_string(), "Y".to_string()],
        ),
        TestCase::new("both empty", (vec![], vec![], 5usize), Vec::new()),
    ];
    run_table_tests(cases, |(lexical, semantic, top_k)| {
        fused_ids(&lexical, &semantic, top_k)
    })
}

#[test]
fn scores_are_rrf_sums() {
    let config = RrfConfig::default();
    let fused = fuse_results(&list(&["A", "B"], "l"), &list(&["B"], "s"), &config, 10);
    let b = fused.documents.iter().find(|d| d.id == "B").unwrap();
    let expected = 1.0 / 62.0 + 1.0 / 61.0;
    assert!((b.score - expected).abs() < 1e-12);
    assert_eq!(fused.candidates, 2);
}

#[test]
fn semantic_only_document_keeps_semantic_payload() {
    let fused = fuse_results(
        &list(&["A"], "lexical"),
        &list(&["Z"], "semantic"),
        &RrfConfig::default(),
        5,
    );
    let z = fused.documents.iter().find(|d| d.id == "Z").unwrap();
    assert_eq!(z.title.as_deref(), Some("semantic Z"));
}
