//! Shared search types: modes, weights, sort overrides, documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::query::ProcessedQuery;

pub const MIN_TOP_K: usize = 1;
pub const MAX_TOP_K: usize = 100;

/// Retrieval strategy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RetrievalMode {
    /// BM25 multi-field keyword matching
    #[serde(rename = "bm25", alias = "lexical")]
    Lexical,
    /// Embedding similarity only
    #[serde(rename = "semantic", alias = "vector")]
    Semantic,
    /// Single backend request mixing both signals by weight
    #[default]
    #[serde(rename = "hybrid", alias = "hybrid_weighted")]
    HybridWeighted,
    /// Two backend requests merged by reciprocal rank fusion
    #[serde(rename = "rrf", alias = "hybrid_rrf")]
    HybridRrf,
}

impl RetrievalMode {
    pub const ALL: [Self; 4] = [
        Self::Lexical,
        Self::Semantic,
        Self::HybridWeighted,
        Self::HybridRrf,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "bm25",
            Self::Semantic => "semantic",
            Self::HybridWeighted => "hybrid",
            Self::HybridRrf => "rrf",
        }
    }

    /// Every mode except lexical needs a query embedding.
    #[must_use]
    pub const fn needs_embedding(self) -> bool {
        !matches!(self, Self::Lexical)
    }
}

impl FromStr for RetrievalMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bm25" | "lexical" | "keyword" => Ok(Self::Lexical),
            "semantic" | "vector" => Ok(Self::Semantic),
            "hybrid" | "weighted" | "hybrid_weighted" | "hybrid-weighted" => {
                Ok(Self::HybridWeighted)
            }
            "rrf" | "hybrid_rrf" | "hybrid-rrf" => Ok(Self::HybridRrf),
            other => Err(SearchError::InvalidParameter(format!(
                "unknown search mode {other:?} (expected bm25|semantic|hybrid|rrf)"
            ))),
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-retrieval ordering applied on top of relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOverride {
    #[default]
    #[serde(alias = "none")]
    Relevance,
    DateDesc,
    DateAsc,
    TitleAsc,
}

impl SortOverride {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::DateDesc => "date_desc",
            Self::DateAsc => "date_asc",
            Self::TitleAsc => "title_asc",
        }
    }
}

impl FromStr for SortOverride {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "" | "none" | "relevance" => Ok(Self::Relevance),
            "date_desc" | "newest" => Ok(Self::DateDesc),
            "date_asc" | "oldest" => Ok(Self::DateAsc),
            "title_asc" | "title" => Ok(Self::TitleAsc),
            other => Err(SearchError::InvalidParameter(format!(
                "unknown sort {other:?} (expected relevance|date_desc|date_asc|title_asc)"
            ))),
        }
    }
}

impl fmt::Display for SortOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical/vector weights for [`RetrievalMode::HybridWeighted`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPair {
    pub lexical: f64,
    pub vector: f64,
}

impl Default for WeightPair {
    fn default() -> Self {
        Self {
            lexical: 0.5,
            vector: 0.5,
        }
    }
}

impl WeightPair {
    #[must_use]
    pub const fn new(lexical: f64, vector: f64) -> Self {
        Self { lexical, vector }
    }

    /// Reject weights outside `[0, 1]` or non-finite.
    pub fn validate(self) -> Result<Self> {
        for (name, value) in [("lexical_weight", self.lexical), ("vector_weight", self.vector)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SearchError::InvalidParameter(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(self)
    }

    /// Scale so the pair sums to 1. A zero sum falls back to an even split.
    #[must_use]
    pub fn normalized(self) -> Self {
        let total = self.lexical + self.vector;
        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self {
            lexical: self.lexical / total,
            vector: self.vector / total,
        }
    }
}

/// One article as returned by the backend.
///
/// Only `id`, `title`, `published_at` and `score` are ever interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub score: f64,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            title: None,
            excerpt: None,
            body_text: None,
            tags: Vec::new(),
            published_at: None,
            score,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    #[must_use]
    pub fn with_published_at(mut self, date: impl Into<String>) -> Self {
        self.published_at = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A validated-at-the-boundary search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub mode: RetrievalMode,
    pub top_k: usize,
    /// Only consulted by [`RetrievalMode::HybridWeighted`].
    pub weights: Option<WeightPair>,
    pub sort: SortOverride,
    pub spell_check: bool,
    pub session_id: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, mode: RetrievalMode) -> Self {
        Self {
            query: query.into(),
            mode,
            top_k: 10,
            weights: None,
            sort: SortOverride::Relevance,
            spell_check: true,
            session_id: None,
        }
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub const fn with_weights(mut self, weights: WeightPair) -> Self {
        self.weights = Some(weights);
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortOverride) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn with_spell_check(mut self, enabled: bool) -> Self {
        self.spell_check = enabled;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Boundary checks: non-blank query, `top_k` in `[1, 100]`, weights in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidParameter(
                "query must not be empty".to_string(),
            ));
        }
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&self.top_k) {
            return Err(SearchError::InvalidParameter(format!(
                "top_k must be within [{MIN_TOP_K}, {MAX_TOP_K}], got {}",
                self.top_k
            )));
        }
        if let Some(weights) = self.weights {
            weights.validate()?;
        }
        Ok(())
    }
}

/// Result of a successful search. An empty `results` means "no matches",
/// which is distinct from any error.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub processed: ProcessedQuery,
    pub mode: RetrievalMode,
    pub sort: SortOverride,
    /// Backend-reported matches, or distinct fused candidates under RRF.
    pub total_matches: u64,
    pub results: Vec<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_log_id: Option<i64>,
}

impl SearchOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
