use std::collections::HashSet;

use proptest::prelude::*;

use article_search::search::sort::apply_sort;
use article_search::search::{Document, RrfConfig, SortOverride, fuse_results};

fn docs(ids: Vec<u8>) -> Vec<Document> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| Document::new(id.to_string(), 1.0))
        .collect()
}

fn sort_strategy() -> impl Strategy<Value = SortOverride> {
    prop_oneof![
        Just(SortOverride::Relevance),
        Just(SortOverride::DateDesc),
        Just(SortOverride::DateAsc),
        Just(SortOverride::TitleAsc),
    ]
}

proptest! {
    #[test]
    fn rrf_scores_are_bounded_and_descending(
        lexical in prop::collection::vec(0u8..40, 0..30),
        semantic in prop::collection::vec(0u8..40, 0..30),
        k in 1.0f64..120.0,
        top_k in 1usize..50,
    ) {
        let config = RrfConfig::new(k);
        let fused = fuse_results(&docs(lexical), &docs(semantic), &config, top_k);

        prop_assert!(fused.documents.len() <= top_k);
        prop_assert!(fused.documents.len() <= fused.candidates);
        let upper = 2.0 / (k + 1.0);
        for doc in &fused.documents {
            prop_assert!(doc.score > 0.0);
            prop_assert!(doc.score <= upper + 1e-12);
        }
        for pair in fused.documents.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        let unique: HashSet<&str> = fused.documents.iter().map(|d| d.id.as_str()).collect();
        prop_assert_eq!(unique.len(), fused.documents.len());
    }

    #[test]
    fn sort_override_preserves_membership(
        dated in prop::collection::vec((0u32..3000, any::<bool>()), 0..20),
        sort in sort_strategy(),
    ) {
        let mut results: Vec<Document> = dated
            .iter()
            .enumerate()
            .map(|(i, (day, has_date))| {
                let doc = Document::new(i.to_string(), 1.0).with_title(format!("t{day}"));
                if *has_date {
                    let date = chrono::NaiveDate::from_num_days_from_ce_opt(730_000 + *day as i32)
                        .expect("day offset stays in range");
                    doc.with_published_at(date.format("%Y-%m-%d").to_string())
                } else {
                    doc
                }
            })
            .collect();
        let before: HashSet<String> = results.iter().map(|d| d.id.clone()).collect();

        apply_sort(&mut results, sort);

        let after: HashSet<String> = results.iter().map(|d| d.id.clone()).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(results.len(), dated.len());
    }
}
