use std::sync::Arc;

use article_search::search::Document;
use article_search::suggest::{BackendTitleSource, FileTitleSource, SuggestionCache};
use article_search::test_utils::fakes::StaticBackend;
use article_search::test_utils::fixtures::UnitTestFixture;

#[test]
fn backend_titles_feed_the_cache() {
    let backend = StaticBackend::new().with_lexical(vec![
        Document::new("1", 1.0).with_title("Healthcare bill stalls"),
        Document::new("2", 1.0).with_title("Tax reform advances"),
        Document::new("3", 1.0),
    ]);
    let source = BackendTitleSource::new(Arc::new(backend), "articles", 100);

    let cache = SuggestionCache::default();
    assert_eq!(cache.reload(&source).unwrap(), 2);
    assert_eq!(cache.suggest("REFORM", 5), vec!["Tax reform advances".to_string()]);
}

#[test]
fn failed_reload_keeps_previous_titles() {
    let fixture = UnitTestFixture::new();
    let titles = fixture.create_titles(&["Climate talks stall", "Storm season outlook"]);

    let cache = SuggestionCache::default();
    cache.reload(&FileTitleSource::new(&titles)).unwrap();

    let broken = BackendTitleSource::new(Arc::new(StaticBackend::new().unreachable()), "articles", 10);
    assert!(cache.reload(&broken).is_err());

    assert_eq!(cache.info().titles, 2);
    assert_eq!(cache.suggest("storm", 10), vec!["Storm season outlook".to_string()]);
}
