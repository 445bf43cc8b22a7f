use httpmock::Method::HEAD;
use httpmock::prelude::*;
use serde_json::json;

use article_search::search::strategy::lexical_query;
use article_search::search::{OpenSearchClient, SearchBackend, StrategyOptions};

fn search_response() -> serde_json::Value {
    json!({
        "took": 3,
        "hits": {
            "total": { "value": 42, "relation": "eq" },
            "hits": [
                {
                    "_id": "es-1",
                    "_score": 8.5,
                    "_source": {
                        "id": 101,
                        "title": "Senate passes healthcare policy overhaul",
                        "published_at": "2017-07-28"
                    }
                },
                {
                    "_id": "es-2",
                    "_score": 3.25,
                    "_source": { "title": "Hospitals brace for policy changes" }
                }
            ]
        }
    })
}

#[test]
fn execute_posts_query_and_maps_hits() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/articles/_search");
        then.status(200).json_body(search_response());
    });

    let client = OpenSearchClient::new(&server.base_url(), 5).unwrap();
    let spec = lexical_query("healthcare policy", 10, &StrategyOptions::default());
    let hits = client.execute("articles", &spec).unwrap();

    mock.assert();
    assert_eq!(hits.total, 42);
    assert_eq!(hits.hits.len(), 2);
    assert_eq!(hits.hits[0].id, "101");
    assert_eq!(hits.hits[0].published_at.as_deref(), Some("2017-07-28"));
    assert_eq!(hits.hits[1].id, "es-2");
    assert!((hits.hits[1].score - 3.25).abs() < f64::EPSILON);
}

#[test]
fn missing_collection_on_search_is_backend_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/gone/_search");
        then.status(404).json_body(json!({ "error": "index_not_found_exception" }));
    });

    let client = OpenSearchClient::new(&server.base_url(), 5).unwrap();
    let spec = lexical_query("anything", 5, &StrategyOptions::default());
    let err = client.execute("gone", &spec).unwrap_err();

    assert_eq!(err.code(), "backend_unavailable");
    assert!(err.is_retryable());
}

#[test]
fn server_error_is_backend_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/articles/_search");
        then.status(500).body("shard failure");
    });

    let client = OpenSearchClient::new(&server.base_url(), 5).unwrap();
    let spec = lexical_query("anything", 5, &StrategyOptions::default());
    let err = client.execute("articles", &spec).unwrap_err();
    assert_eq!(err.code(), "backend_unavailable");
    assert!(err.to_string().contains("500"));
}

#[test]
fn exists_maps_head_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/articles");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(HEAD).path("/missing");
        then.status(404);
    });

    let client = OpenSearchClient::new(&server.base_url(), 5).unwrap();
    assert!(client.exists("articles").unwrap());
    assert!(!client.exists("missing").unwrap());
}

#[test]
fn info_reads_cluster_name_and_version() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).json_body(json!({
            "cluster_name": "news-cluster",
            "version": { "number": "2.11.0" }
        }));
    });

    let client = OpenSearchClient::new(&server.base_url(), 5).unwrap();
    let info = client.info().unwrap();
    assert_eq!(info.cluster_name, "news-cluster");
    assert_eq!(info.version.as_deref(), Some("2.11.0"));
}

#[test]
fn unreachable_backend_is_backend_unavailable() {
    // Nothing listens on port 9 (discard) in the test environment.
    let client = OpenSearchClient::new("http://127.0.0.1:9", 1).unwrap();
    let err = client.info().unwrap_err();
    assert_eq!(err.code(), "backend_unavailable");
}
