//! OpenSearch REST client.
//!
//! Blocking HTTP against `/{index}/_search`, `HEAD /{index}` and `GET /`.
//! Every failure (transport, status, body) surfaces as
//! `BackendUnavailable`; no retries happen here.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::BackendConfig;
use crate::error::{Result, SearchError};
use crate::search::backend::{BackendHits, ClusterInfo, SearchBackend};
use crate::search::strategy::QuerySpec;
use crate::search::types::Document;

/// Client for a single OpenSearch (or Elasticsearch-compatible) endpoint.
pub struct OpenSearchClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OpenSearchClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|err| SearchError::Config(format!("opensearch http client: {err}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.url, config.timeout_secs)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl SearchBackend for OpenSearchClient {
    fn execute(&self, collection: &str, spec: &QuerySpec) -> Result<BackendHits> {
        let url = self.url(&format!("{collection}/_search"));
        trace!(target: "backend", %url, body = %spec.body(), "executing query");

        let response = self
            .client
            .post(&url)
            .json(spec.body())
            .send()
            .map_err(|err| SearchError::BackendUnavailable(format!("search request failed: {err}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SearchError::BackendUnavailable(format!(
                "collection '{collection}' does not exist"
            )));
        }
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(SearchError::BackendUnavailable(format!(
                "search HTTP {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let body: SearchResponseBody = response.json().map_err(|err| {
            SearchError::BackendUnavailable(format!("search response parse: {err}"))
        })?;
        let hits = body.into_hits();

        debug!(
            target: "backend",
            collection,
            total = hits.total,
            returned = hits.hits.len(),
            "query executed"
        );
        Ok(hits)
    }

    fn exists(&self, collection: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.url(collection))
            .send()
            .map_err(|err| SearchError::BackendUnavailable(format!("index check failed: {err}")))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(SearchError::BackendUnavailable(format!(
                "index check HTTP {status}"
            ))),
        }
    }

    fn info(&self) -> Result<ClusterInfo> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .map_err(|err| SearchError::BackendUnavailable(format!("cluster info failed: {err}")))?;
        if !response.status().is_success() {
            return Err(SearchError::BackendUnavailable(format!(
                "cluster info HTTP {}",
                response.status()
            )));
        }
        let body: InfoBody = response.json().map_err(|err| {
            SearchError::BackendUnavailable(format!("cluster info parse: {err}"))
        })?;
        Ok(ClusterInfo {
            cluster_name: body.cluster_name,
            version: body.version.and_then(|v| v.number),
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct InfoBody {
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    version: Option<InfoVersion>,
}

#[derive(Debug, Deserialize)]
struct InfoVersion {
    #[serde(default)]
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// `hits.total` is an object on 7.x+ and a bare number on older clusters.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: Option<RawSource>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    body_text: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    published_at: Option<String>,
}

impl SearchResponseBody {
    fn into_hits(self) -> BackendHits {
        let hits: Vec<Document> = self.hits.hits.into_iter().map(RawHit::into_document).collect();
        let total = match self.hits.total {
            Some(TotalHits::Object { value } | TotalHits::Count(value)) => value,
            None => hits.len() as u64,
        };
        BackendHits { total, hits }
    }
}

impl RawHit {
    fn into_document(self) -> Document {
        let source = self.source.unwrap_or_default();
        let id = match source.id {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(n)) => n.to_string(),
            _ => self.id,
        };
        Document {
            id,
            title: source.title,
            excerpt: source.excerpt,
            body_text: source.body_text,
            tags: source.tags.unwrap_or_default(),
            published_at: source.published_at,
            score: self.score.unwrap_or_default(),
        }
    }
}
