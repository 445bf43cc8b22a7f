use httpmock::prelude::*;
use serde_json::json;

use article_search::search::{CachedEmbedder, Embedder, HttpEmbedder};

#[test]
fn flat_response_shape() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(200)
            .json_body(json!({ "embedding": [0.1, 0.2, 0.3] }));
    });

    let embedder = HttpEmbedder::new(&server.url("/embed"), 3, 5).unwrap();
    let vector = embedder.embed("healthcare policy").unwrap();

    mock.assert();
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    assert_eq!(embedder.name(), "http");
}

#[test]
fn data_response_shape() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/embeddings");
        then.status(200).json_body(json!({
            "object": "list",
            "data": [ { "index": 0, "embedding": [1.0, 0.0] } ]
        }));
    });

    let embedder = HttpEmbedder::new(&server.url("/v1/embeddings"), 2, 5).unwrap();
    assert_eq!(embedder.embed("storm").unwrap(), vec![1.0, 0.0]);
}

#[test]
fn dimension_mismatch_is_embedding_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(200).json_body(json!({ "embedding": [0.1, 0.2] }));
    });

    let embedder = HttpEmbedder::new(&server.url("/embed"), 4, 5).unwrap();
    let err = embedder.embed("storm").unwrap_err();
    assert_eq!(err.code(), "embedding_failure");
}

#[test]
fn http_error_is_embedding_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(503);
    });

    let embedder = HttpEmbedder::new(&server.url("/embed"), 3, 5).unwrap();
    let err = embedder.embed("storm").unwrap_err();
    assert_eq!(err.code(), "embedding_failure");
    assert!(!err.is_retryable());
}

#[test]
fn cache_serves_repeats_without_new_requests() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embed");
        then.status(200).json_body(json!({ "embedding": [0.5, 0.5] }));
    });

    let cached = CachedEmbedder::new(HttpEmbedder::new(&server.url("/embed"), 2, 5).unwrap(), 8);
    let first = cached.embed("tax reform").unwrap();
    let second = cached.embed("tax reform").unwrap();

    assert_eq!(first, second);
    let stats = cached.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}
