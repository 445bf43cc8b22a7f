use std::sync::Arc;

use article_search::query::{
    FrequencyDictionary, NoopDictionary, QueryProcessor, normalize, spell_correct,
    strip_disallowed_characters, DEFAULT_KEEP_CHARS,
};
use article_search::test_utils::fakes::MapDictionary;
use article_search::test_utils::{TestCase, run_table_tests};

#[test]
fn normalize_table() -> Result<(), String> {
    let cases = vec![
        TestCase::new("collapses and lowercases", "  Climate   CHANGE ", "climate change".to_string()),
        TestCase::new("tabs and newlines", "Tax\t\nReform", "tax reform".to_string()),
        TestCase::new("blank", "   ", String::new()),
        TestCase::new("already normal", "vote", "vote".to_string()),
    ];
    run_table_tests(cases, normalize)
}

#[test]
fn strip_table() -> Result<(), String> {
    let cases = vec![
        TestCase::new("keeps hyphen and apostrophe", "don't stop-now!!", "don't stop-now".to_string()),
        TestCase::new("drops punctuation between words", "u.s. policy?", "us policy".to_string()),
        TestCase::new("only symbols", "!!!", String::new()),
    ];
    run_table_tests(cases, |text| strip_disallowed_characters(text, DEFAULT_KEEP_CHARS))
}

#[test]
fn spell_correct_skips_short_and_numeric_tokens() {
    let dictionary = MapDictionary::new([("ai", "air"), ("5g", "go")]);
    assert_eq!(spell_correct("ai 5g", &dictionary), ("ai 5g".to_string(), false));
    assert_eq!(spell_correct("ai 5g", &NoopDictionary), ("ai 5g".to_string(), false));
}

#[test]
fn processor_runs_all_stages_in_order() {
    let dictionary = MapDictionary::new([("helth", "health")]);
    let processor = QueryProcessor::new(Arc::new(dictionary));

    let processed = processor.process("  HELTH   Care!! ", true);
    assert_eq!(processed.text, "health care");
    assert!(processed.was_corrected);

    let unchecked = processor.process("  HELTH   Care!! ", false);
    assert_eq!(unchecked.text, "helth care");
    assert!(!unchecked.was_corrected);
}

#[test]
fn frequency_dictionary_loaded_from_file() {
    let fixture = article_search::test_utils::fixtures::UnitTestFixture::new();
    let path = fixture.create_dictionary(&[("election", 40), ("selection", 5)]);
    let dictionary = FrequencyDictionary::load(&path, 2).unwrap();
    let processor = QueryProcessor::new(Arc::new(dictionary));

    let processed = processor.process("Electon results", true);
    assert_eq!(processed.text, "election results");
    assert!(processed.was_corrected);
}
