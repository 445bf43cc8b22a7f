//! Search orchestration
//!
//! One request runs: validate, normalize, embed (non-lexical modes), build,
//! execute, fuse (RRF only), sort, log. The first error ends the request;
//! nothing here retries.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Result, SearchError};
use crate::query::{ProcessedQuery, QueryProcessor};
use crate::search::backend::{BackendHits, SearchBackend};
use crate::search::embeddings::Embedder;
use crate::search::fusion::{RrfConfig, fuse_results};
use crate::search::sort::apply_sort;
use crate::search::strategy::{QueryPlan, QuerySpec, StrategyInput, StrategyOptions, build_plan};
use crate::search::types::{Document, SearchOutcome, SearchRequest, WeightPair};
use crate::telemetry::{FeedbackRecord, SearchLogRecord, TelemetrySink};

/// Static settings for a [`SearchEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub collection: String,
    pub rrf: RrfConfig,
    pub strategy: StrategyOptions,
    /// Used by hybrid-weighted requests that carry no weights of their own.
    pub default_weights: WeightPair,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection: "articles".to_string(),
            rrf: RrfConfig::default(),
            strategy: StrategyOptions::default(),
            default_weights: WeightPair::default(),
        }
    }
}

/// The search orchestrator. All collaborators are injected at construction.
pub struct SearchEngine {
    backend: Arc<dyn SearchBackend>,
    embedder: Arc<dyn Embedder>,
    processor: Arc<QueryProcessor>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        embedder: Arc<dyn Embedder>,
        processor: Arc<QueryProcessor>,
        config: EngineConfig,
    ) -> Self {
        Self {
            backend,
            embedder,
            processor,
            telemetry: None,
            config,
        }
    }

    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    #[must_use]
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Run one search request end to end.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let started = Instant::now();
        request.validate()?;

        let processed = self.processor.process(&request.query, request.spell_check);
        if processed.text.is_empty() {
            return Err(SearchError::InvalidParameter(
                "query has no searchable characters".to_string(),
            ));
        }
        debug!(
            target: "search",
            raw = %request.query,
            processed = %processed.text,
            corrected = processed.was_corrected,
            "query normalized"
        );

        let collection = &self.config.collection;
        if !self.backend.exists(collection)? {
            return Err(SearchError::BackendUnavailable(format!(
                "collection '{collection}' does not exist"
            )));
        }

        let embedding = if request.mode.needs_embedding() {
            Some(self.embed(&processed.text)?)
        } else {
            None
        };

        let input = StrategyInput {
            text: &processed.text,
            embedding: embedding.as_deref(),
            top_k: request.top_k,
            weights: request.weights.unwrap_or(self.config.default_weights),
        };
        let plan = build_plan(request.mode, &input, &self.config.strategy)?;

        let (total_matches, mut results) = match plan {
            QueryPlan::Single(spec) => {
                let BackendHits { total, mut hits } = self.backend.execute(collection, &spec)?;
                hits.truncate(request.top_k);
                (total, hits)
            }
            QueryPlan::Fused { lexical, semantic } => {
                let (lexical_hits, semantic_hits) = self.execute_pair(&lexical, &semantic)?;
                let fused = fuse_results(
                    &lexical_hits.hits,
                    &semantic_hits.hits,
                    &self.config.rrf,
                    request.top_k,
                );
                (fused.candidates as u64, fused.documents)
            }
        };

        apply_sort(&mut results, request.sort);

        let search_log_id = self.log_search(request, &processed, total_matches, results.len());

        info!(
            target: "search",
            mode = %request.mode,
            total_matches,
            returned = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search completed"
        );

        Ok(SearchOutcome {
            query: request.query.clone(),
            processed,
            mode: request.mode,
            sort: request.sort,
            total_matches,
            results,
            search_log_id,
        })
    }

    /// Store one feedback record. Fails when no telemetry sink is configured.
    pub fn record_feedback(&self, record: &FeedbackRecord) -> Result<i64> {
        let sink = self
            .telemetry
            .as_ref()
            .ok_or_else(|| SearchError::Telemetry("telemetry is disabled".to_string()))?;
        sink.log_feedback(record)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).map_err(|err| match err {
            SearchError::EmbeddingFailure(_) => err,
            other => SearchError::EmbeddingFailure(other.to_string()),
        })
    }

    /// Issue both RRF sub-queries concurrently. Either one failing fails the
    /// request; a partial fusion is never attempted.
    fn execute_pair(
        &self,
        lexical: &QuerySpec,
        semantic: &QuerySpec,
    ) -> Result<(BackendHits, BackendHits)> {
        let collection = &self.config.collection;
        let (lexical_result, semantic_result) = rayon::join(
            || self.backend.execute(collection, lexical),
            || self.backend.execute(collection, semantic),
        );

        match (lexical_result, semantic_result) {
            (Ok(lexical), Ok(semantic)) => Ok((lexical, semantic)),
            (Err(err), Err(_)) => Err(err),
            (Err(err), Ok(_)) => Err(mismatch("lexical", &err)),
            (Ok(_), Err(err)) => Err(mismatch("semantic", &err)),
        }
    }

    fn log_search(
        &self,
        request: &SearchRequest,
        processed: &ProcessedQuery,
        total_matches: u64,
        returned: usize,
    ) -> Option<i64> {
        let sink = self.telemetry.as_ref()?;
        let record = SearchLogRecord {
            query: request.query.clone(),
            processed_query: Some(processed.text.clone()),
            mode: request.mode,
            sort: request.sort,
            total_matches,
            returned,
            session_id: request.session_id.clone(),
            at: Utc::now(),
        };
        match sink.log_search(&record) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(target: "telemetry", error = %err, "failed to log search");
                None
            }
        }
    }
}

fn mismatch(failed: &'static str, err: &SearchError) -> SearchError {
    warn!(target: "fusion", failed, error = %err, "rrf sub-query failed");
    SearchError::FusionInputMismatch {
        failed,
        reason: err.to_string(),
    }
}

/// Identity set of a result list, for membership comparisons.
#[must_use]
pub fn result_ids(results: &[Document]) -> Vec<&str> {
    results.iter().map(|doc| doc.id.as_str()).collect()
}
