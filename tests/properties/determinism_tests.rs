use proptest::prelude::*;

use article_search::query::{DEFAULT_KEEP_CHARS, normalize, strip_disallowed_characters};
use article_search::search::HashEmbedder;

proptest! {
    #[test]
    fn normalize_is_idempotent(text in "[ a-zA-Z0-9\t\n.,'!?-]{0,60}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_text_has_no_edge_or_double_spaces(text in "[ a-zA-Z\t\n]{0,40}") {
        let out = normalize(&text);
        prop_assert!(!out.starts_with(' '));
        prop_assert!(!out.ends_with(' '));
        prop_assert!(!out.contains("  "));
        prop_assert_eq!(out.to_lowercase(), out.clone());
    }

    #[test]
    fn stripping_keeps_only_allowed_characters(text in ".*") {
        let out = strip_disallowed_characters(&normalize(&text), DEFAULT_KEEP_CHARS);
        prop_assert!(out
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || DEFAULT_KEEP_CHARS.contains(&c)));
    }

    #[test]
    fn hash_embedding_deterministic(text in ".*") {
        let embedder = HashEmbedder::new(64);
        prop_assert_eq!(embedder.embed_text(&text), embedder.embed_text(&text));
    }

    #[test]
    fn hash_embedding_length(text in ".*", dim in 1usize..256usize) {
        let embedder = HashEmbedder::new(dim);
        prop_assert_eq!(embedder.embed_text(&text).len(), dim);
    }
}
