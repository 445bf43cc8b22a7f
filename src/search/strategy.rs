//! Retrieval strategy builders
//!
//! Pure translation from (query text, embedding, top_k, weights) to
//! OpenSearch query bodies. Nothing here talks to the backend or the
//! embedder; [`build_plan`] is the single place a mode picks its builder.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, SearchError};
use crate::search::types::{RetrievalMode, WeightPair};

/// Field boosts: title heaviest, excerpt medium, body baseline.
pub const LEXICAL_FIELDS: [&str; 3] = ["title^3", "excerpt^2", "body_text"];

/// Fraction of non-best field scores added to the best field score.
pub const TIE_BREAKER: f64 = 0.3;

/// Candidate over-fetch factor for lists that will be re-ranked.
pub const RERANK_OVERFETCH: usize = 2;

/// How the semantic side is expressed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorQueryKind {
    /// Exact cosine scoring via `script_score` over all documents
    #[default]
    ScriptScore,
    /// Approximate k-nearest-neighbor clause
    Knn,
}

/// Backend-facing options that are fixed per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOptions {
    pub embedding_field: String,
    pub vector_query: VectorQueryKind,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            embedding_field: "embedding".to_string(),
            vector_query: VectorQueryKind::ScriptScore,
        }
    }
}

/// Opaque backend request body.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    body: Value,
    size: usize,
}

impl QuerySpec {
    fn new(size: usize, query: Value, options: &StrategyOptions) -> Self {
        Self {
            body: json!({
                "size": size,
                "query": query,
                "_source": { "excludes": [options.embedding_field] },
            }),
            size,
        }
    }

    /// Title-only listing used to seed autocomplete.
    #[must_use]
    pub fn titles(limit: usize) -> Self {
        Self {
            body: json!({
                "size": limit,
                "query": { "match_all": {} },
                "_source": ["id", "title"],
            }),
            size: limit,
        }
    }

    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Number of candidates requested.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

/// What the orchestrator must execute for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// One request whose hits are the answer
    Single(QuerySpec),
    /// Two independent requests to be merged by rank fusion
    Fused {
        lexical: QuerySpec,
        semantic: QuerySpec,
    },
}

/// Inputs shared by every builder.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub text: &'a str,
    pub embedding: Option<&'a [f32]>,
    pub top_k: usize,
    pub weights: WeightPair,
}

/// Pick the builder for `mode` and produce its plan.
pub fn build_plan(
    mode: RetrievalMode,
    input: &StrategyInput<'_>,
    options: &StrategyOptions,
) -> Result<QueryPlan> {
    match mode {
        RetrievalMode::Lexical => Ok(QueryPlan::Single(lexical_query(
            input.text,
            input.top_k,
            options,
        ))),
        RetrievalMode::Semantic => Ok(QueryPlan::Single(semantic_query(
            require_embedding(input)?,
            input.top_k,
            false,
            options,
        ))),
        RetrievalMode::HybridWeighted => Ok(QueryPlan::Single(hybrid_weighted_query(
            input.text,
            require_embedding(input)?,
            input.top_k,
            input.weights,
            options,
        ))),
        RetrievalMode::HybridRrf => {
            let embedding = require_embedding(input)?;
            Ok(QueryPlan::Fused {
                lexical: lexical_query(input.text, input.top_k * RERANK_OVERFETCH, options),
                semantic: semantic_query(embedding, input.top_k, true, options),
            })
        }
    }
}

fn require_embedding<'a>(input: &StrategyInput<'a>) -> Result<&'a [f32]> {
    input.embedding.ok_or_else(|| {
        SearchError::InvalidParameter("query embedding required for this mode".to_string())
    })
}

fn multi_match(text: &str) -> Value {
    json!({
        "query": text,
        "fields": LEXICAL_FIELDS,
        "type": "best_fields",
        "tie_breaker": TIE_BREAKER,
    })
}

fn vector_clause(embedding: &[f32], size: usize, options: &StrategyOptions) -> Value {
    match options.vector_query {
        VectorQueryKind::ScriptScore => json!({
            "script_score": {
                "query": { "match_all": {} },
                "script": {
                    "source": format!(
                        "cosineSimilarity(params.query_vector, '{}') + 1.0",
                        options.embedding_field
                    ),
                    "params": { "query_vector": embedding },
                },
            }
        }),
        VectorQueryKind::Knn => {
            let mut field = serde_json::Map::new();
            field.insert(
                options.embedding_field.clone(),
                json!({ "vector": embedding, "k": size }),
            );
            json!({ "knn": field })
        }
    }
}

/// Best-fields BM25 over title/excerpt/body.
#[must_use]
pub fn lexical_query(text: &str, size: usize, options: &StrategyOptions) -> QuerySpec {
    QuerySpec::new(size, json!({ "multi_match": multi_match(text) }), options)
}

/// Vector similarity. `for_rerank` doubles the candidate count.
#[must_use]
pub fn semantic_query(
    embedding: &[f32],
    top_k: usize,
    for_rerank: bool,
    options: &StrategyOptions,
) -> QuerySpec {
    let size = if for_rerank {
        top_k * RERANK_OVERFETCH
    } else {
        top_k
    };
    QuerySpec::new(size, vector_clause(embedding, size, options), options)
}

/// Union of the lexical and vector clauses, each boosted by its normalized
/// weight, scored by the backend in one pass.
///
/// BM25 scores are unbounded while the cosine script lives in `[0, 2]`, so
/// the weights do not mean "share of the final score". The mix is kept
/// as-is; [`RetrievalMode::HybridRrf`] is the scale-free alternative.
#[must_use]
pub fn hybrid_weighted_query(
    text: &str,
    embedding: &[f32],
    top_k: usize,
    weights: WeightPair,
    options: &StrategyOptions,
) -> QuerySpec {
    let weights = weights.normalized();

    let mut lexical = multi_match(text);
    lexical["boost"] = json!(weights.lexical);

    let mut vector = vector_clause(embedding, top_k, options);
    if let Some(inner) = vector.as_object_mut().and_then(|o| o.values_mut().next()) {
        match options.vector_query {
            VectorQueryKind::ScriptScore => inner["boost"] = json!(weights.vector),
            VectorQueryKind::Knn => {
                if let Some(field) = inner.as_object_mut().and_then(|o| o.values_mut().next()) {
                    field["boost"] = json!(weights.vector);
                }
            }
        }
    }

    QuerySpec::new(
        top_k,
        json!({
            "bool": {
                "should": [ { "multi_match": lexical }, vector ],
            }
        }),
        options,
    )
}
