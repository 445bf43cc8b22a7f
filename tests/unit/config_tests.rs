use std::fs;
use std::path::PathBuf;

use article_search::config::{Config, EmbeddingProvider, SuggestSourceKind};
use article_search::search::{RetrievalMode, SortOverride, VectorQueryKind};
use article_search::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_fixture(relative: &str) -> Config {
    let content = fs::read_to_string(fixture_path(relative)).expect("read fixture");
    Config::from_toml(&content).expect("parse config")
}

#[test]
fn search_section_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "default",
            "tests/fixtures/configs/default.toml",
            (RetrievalMode::HybridWeighted, 10usize, 0.5f64, 0.5f64, true, SortOverride::Relevance),
        ),
        TestCase::new(
            "custom",
            "tests/fixtures/configs/custom.toml",
            (RetrievalMode::HybridRrf, 20usize, 0.3f64, 0.7f64, false, SortOverride::DateDesc),
        ),
    ];

    run_table_tests(cases, |relative_path| {
        let search = load_fixture(relative_path).search;
        (
            search.default_mode,
            search.top_k,
            search.lexical_weight,
            search.vector_weight,
            search.spell_check,
            search.default_sort,
        )
    })
}

#[test]
fn backend_and_embedding_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "default",
            "tests/fixtures/configs/default.toml",
            (
                "articles".to_string(),
                VectorQueryKind::ScriptScore,
                EmbeddingProvider::Hash,
                None,
                384usize,
            ),
        ),
        TestCase::new(
            "custom",
            "tests/fixtures/configs/custom.toml",
            (
                "news_2017".to_string(),
                VectorQueryKind::Knn,
                EmbeddingProvider::Http,
                Some("http://embedder:8080/embed".to_string()),
                768usize,
            ),
        ),
    ];

    run_table_tests(cases, |relative_path| {
        let config = load_fixture(relative_path);
        (
            config.backend.collection,
            config.backend.vector_query,
            config.embedding.provider,
            config.embedding.endpoint,
            config.embedding.dims,
        )
    })
}

#[test]
fn telemetry_and_suggest_from_custom_fixture() {
    let config = load_fixture("tests/fixtures/configs/custom.toml");
    assert!(!config.telemetry.enabled);
    assert_eq!(
        config.telemetry.db_path,
        Some(PathBuf::from("/var/lib/asearch/feedback.db"))
    );
    assert_eq!(config.suggest.source, SuggestSourceKind::File);
    assert_eq!(config.suggest.titles_path, Some(PathBuf::from("titles.txt")));
    assert_eq!(config.suggest.max_titles, 100);
    assert_eq!(config.query.max_edit_distance, 1);
}

#[test]
fn out_of_range_fixture_is_rejected() {
    let content = fs::read_to_string(fixture_path("tests/fixtures/configs/invalid.toml")).unwrap();
    let err = Config::from_toml(&content).unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn project_config_is_read_from_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[backend]\ncollection = \"wire\"\n",
    )
    .unwrap();
    let config = Config::load(Some(&dir.path().join("config.toml")), dir.path()).unwrap();
    assert_eq!(config.backend.collection, "wire");
}
