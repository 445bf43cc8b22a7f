use std::sync::Arc;

use chrono::Utc;

use article_search::query::QueryProcessor;
use article_search::search::{
    EngineConfig, HashEmbedder, RetrievalMode, SearchEngine, SearchRequest,
};
use article_search::telemetry::{FeedbackRecord, Rating, SqliteTelemetry, TelemetrySink};
use article_search::test_utils::fakes::StaticBackend;
use article_search::test_utils::fixtures::{UnitTestFixture, sample_articles};

fn feedback(query: &str, doc_id: &str, rating: Rating, log_id: Option<i64>) -> FeedbackRecord {
    FeedbackRecord {
        query: query.to_string(),
        doc_id: doc_id.to_string(),
        doc_title: Some(format!("Article {doc_id}")),
        mode: RetrievalMode::HybridRrf,
        rating,
        position: 1,
        search_log_id: log_id,
        session_id: Some("sess-1".to_string()),
        at: Utc::now(),
    }
}

#[test]
fn searches_and_feedback_persist_across_reopen() {
    let fixture = UnitTestFixture::new();
    let db_path = fixture.db_path();

    {
        let sink = Arc::new(SqliteTelemetry::open(&db_path).unwrap());
        let engine = SearchEngine::new(
            Arc::new(
                StaticBackend::new()
                    .with_lexical(sample_articles())
                    .with_semantic(sample_articles()),
            ),
            Arc::new(HashEmbedder::new(32)),
            Arc::new(QueryProcessor::default()),
            EngineConfig::default(),
        )
        .with_telemetry(sink.clone());

        let outcome = engine
            .search(&SearchRequest::new("healthcare policy", RetrievalMode::HybridRrf))
            .unwrap();
        let log_id = outcome.search_log_id.expect("search should be logged");

        let top = &outcome.results[0].id;
        engine
            .record_feedback(&feedback("healthcare policy", top, Rating::Up, Some(log_id)))
            .unwrap();

        engine
            .search(&SearchRequest::new("zzz", RetrievalMode::Lexical))
            .unwrap();
    }

    let reopened = SqliteTelemetry::open(&db_path).unwrap();
    let report = reopened.analytics(7).unwrap();

    assert_eq!(report.overview.total_searches, 2);
    assert_eq!(report.overview.total_feedback, 1);
    assert_eq!(report.overview.positive_feedback, 1);
    assert!((report.overview.satisfaction_rate - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.searches_by_mode.get("rrf"), Some(&1));
    assert_eq!(report.searches_by_mode.get("bm25"), Some(&1));
    assert_eq!(report.feedback_by_mode["rrf"].positive, 1);
    assert_eq!(report.most_helpful.len(), 1);
}

#[test]
fn invalid_feedback_is_rejected_before_storage() {
    let sink = SqliteTelemetry::in_memory().unwrap();
    let mut record = feedback("tax", "", Rating::Down, None);
    assert_eq!(sink.log_feedback(&record).unwrap_err().code(), "invalid_parameter");

    record.doc_id = "42".to_string();
    record.position = 0;
    assert!(sink.log_feedback(&record).is_err());

    assert_eq!(sink.analytics(1).unwrap().overview.total_feedback, 0);
}

#[test]
fn feedback_ids_increase() {
    let sink = SqliteTelemetry::in_memory().unwrap();
    let first = sink.log_feedback(&feedback("tax", "1", Rating::Up, None)).unwrap();
    let second = sink.log_feedback(&feedback("tax", "2", Rating::Down, None)).unwrap();
    assert!(second > first);

    let report = sink.analytics(1).unwrap();
    assert_eq!(report.overview.negative_feedback, 1);
    assert_eq!(report.least_helpful[0].doc_id, "2");
}
