//! In-memory stand-ins for the external collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, SearchError};
use crate::query::SpellDictionary;
use crate::search::backend::{BackendHits, ClusterInfo, SearchBackend};
use crate::search::embeddings::Embedder;
use crate::search::strategy::QuerySpec;
use crate::search::types::Document;
use crate::telemetry::{FeedbackRecord, SearchLogRecord, TelemetrySink};

/// Which canned list a query body maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Lexical,
    Semantic,
    Hybrid,
    Titles,
}

impl QueryKind {
    /// Classify a built query by its top-level clause.
    #[must_use]
    pub fn of(spec: &QuerySpec) -> Self {
        let query = &spec.body()["query"];
        if query.get("multi_match").is_some() {
            Self::Lexical
        } else if query.get("bool").is_some() {
            Self::Hybrid
        } else if query.get("match_all").is_some() {
            Self::Titles
        } else {
            Self::Semantic
        }
    }
}

/// Backend that answers from fixed lists instead of scoring anything.
///
/// Lexical and hybrid bodies get the lexical list, vector bodies the
/// semantic list, `match_all` both lists' titles.
pub struct StaticBackend {
    lexical: Vec<Document>,
    semantic: Vec<Document>,
    collection_exists: bool,
    unreachable: bool,
    fail_lexical: bool,
    fail_semantic: bool,
    requests: Mutex<Vec<Value>>,
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lexical: Vec::new(),
            semantic: Vec::new(),
            collection_exists: true,
            unreachable: false,
            fail_lexical: false,
            fail_semantic: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_lexical(mut self, docs: Vec<Document>) -> Self {
        self.lexical = docs;
        self
    }

    #[must_use]
    pub fn with_semantic(mut self, docs: Vec<Document>) -> Self {
        self.semantic = docs;
        self
    }

    #[must_use]
    pub const fn without_collection(mut self) -> Self {
        self.collection_exists = false;
        self
    }

    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    #[must_use]
    pub const fn failing_lexical(mut self) -> Self {
        self.fail_lexical = true;
        self
    }

    #[must_use]
    pub const fn failing_semantic(mut self) -> Self {
        self.fail_semantic = true;
        self
    }

    /// Every body passed to `execute`, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    fn down(&self) -> Result<()> {
        if self.unreachable {
            Err(SearchError::BackendUnavailable(
                "connection refused".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl SearchBackend for StaticBackend {
    fn execute(&self, _collection: &str, spec: &QuerySpec) -> Result<BackendHits> {
        self.down()?;
        self.requests.lock().push(spec.body().clone());

        let docs: Vec<Document> = match QueryKind::of(spec) {
            QueryKind::Lexical | QueryKind::Hybrid if self.fail_lexical => {
                return Err(SearchError::BackendUnavailable("lexical shard failed".into()));
            }
            QueryKind::Semantic if self.fail_semantic => {
                return Err(SearchError::BackendUnavailable("vector shard failed".into()));
            }
            QueryKind::Lexical | QueryKind::Hybrid => self.lexical.clone(),
            QueryKind::Semantic => self.semantic.clone(),
            QueryKind::Titles => self.lexical.iter().chain(&self.semantic).cloned().collect(),
        };

        let total = docs.len() as u64;
        let hits = docs.into_iter().take(spec.size()).collect();
        Ok(BackendHits { total, hits })
    }

    fn exists(&self, _collection: &str) -> Result<bool> {
        self.down()?;
        Ok(self.collection_exists)
    }

    fn info(&self) -> Result<ClusterInfo> {
        self.down()?;
        Ok(ClusterInfo {
            cluster_name: "static".to_string(),
            version: None,
        })
    }
}

/// Returns the same vector for every input and counts calls.
pub struct FixedEmbedder {
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    #[must_use]
    pub const fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FixedEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }

    fn dims(&self) -> usize {
        self.vector.len()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Embedder whose model is always down.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(SearchError::EmbeddingFailure("model offline".to_string()))
    }

    fn dims(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Telemetry sink that keeps records in memory. Ids start at 1.
#[derive(Default)]
pub struct MemoryTelemetry {
    searches: Mutex<Vec<SearchLogRecord>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
    fail: bool,
}

impl MemoryTelemetry {
    /// A sink whose every write fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn searches(&self) -> Vec<SearchLogRecord> {
        self.searches.lock().clone()
    }

    #[must_use]
    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.lock().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(SearchError::Telemetry("disk full".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TelemetrySink for MemoryTelemetry {
    fn log_search(&self, record: &SearchLogRecord) -> Result<i64> {
        self.check()?;
        let mut searches = self.searches.lock();
        searches.push(record.clone());
        Ok(searches.len() as i64)
    }

    fn log_feedback(&self, record: &FeedbackRecord) -> Result<i64> {
        self.check()?;
        record.validate()?;
        let mut feedback = self.feedback.lock();
        feedback.push(record.clone());
        Ok(feedback.len() as i64)
    }
}

/// Spell dictionary backed by an explicit misspelling → correction map.
#[derive(Debug, Default)]
pub struct MapDictionary {
    corrections: HashMap<String, String>,
}

impl MapDictionary {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            corrections: pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl SpellDictionary for MapDictionary {
    fn correction(&self, word: &str) -> Option<String> {
        self.corrections.get(word).cloned()
    }
}
