//! RRF (Reciprocal Rank Fusion) for hybrid search
//!
//! score(d) = Σ over lists containing d of 1 / (k + rank), ranks 1-based in
//! backend order. Only ranks matter, so lexical and vector score scales
//! never have to be reconciled.
//!
//! The fused score is bounded by `2 / (k + 1)` and is not comparable across
//! requests that use a different `k` or different candidate depths.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::search::types::Document;

/// Conventional smoothing constant.
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Reciprocal Rank Fusion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RrfConfig {
    /// K parameter (default: 60). Larger values flatten the advantage of
    /// top ranks.
    pub k: f64,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

impl RrfConfig {
    #[must_use]
    pub const fn new(k: f64) -> Self {
        Self { k }
    }

    /// Contribution of a single 1-based rank.
    #[must_use]
    pub fn contribution(&self, rank: usize) -> f64 {
        1.0 / (self.k + rank as f64)
    }

    /// Highest score a document can reach from two lists.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        2.0 * self.contribution(1)
    }
}

/// Per-request accumulator: id → fused score, id → first-seen payload.
///
/// A payload is fixed by the first list that mentions the id; later lists
/// only add score.
#[derive(Debug, Default)]
struct FusionAccumulator {
    scores: HashMap<String, f64>,
    payloads: HashMap<String, Document>,
    /// First-seen order, so output never depends on hash iteration order.
    seen: Vec<String>,
}

impl FusionAccumulator {
    fn fold(&mut self, list: &[Document], config: &RrfConfig) {
        let mut counted: HashSet<&str> = HashSet::new();

        for (index, doc) in list.iter().enumerate() {
            let rank = index + 1;
            // A list mentioning the same id twice only counts its best rank;
            // the repeat still occupies its position.
            if !counted.insert(doc.id.as_str()) {
                continue;
            }

            *self.scores.entry(doc.id.clone()).or_insert(0.0) += config.contribution(rank);
            if !self.payloads.contains_key(&doc.id) {
                self.payloads.insert(doc.id.clone(), doc.clone());
                self.seen.push(doc.id.clone());
            }
        }
    }

    fn into_ranked(mut self, top_k: usize) -> FusedList {
        let candidates = self.seen.len();

        let mut ranked: Vec<(String, f64)> = self
            .seen
            .into_iter()
            .map(|id| {
                let score = self.scores.get(&id).copied().unwrap_or_default();
                (id, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let documents = ranked
            .into_iter()
            .take(top_k)
            .filter_map(|(id, score)| {
                self.payloads.remove(&id).map(|mut doc| {
                    doc.score = score;
                    doc
                })
            })
            .collect();

        FusedList {
            documents,
            candidates,
        }
    }
}

/// Output of [`fuse_results`].
#[derive(Debug, Clone, PartialEq)]
pub struct FusedList {
    /// At most `top_k` documents, fused score descending, unique by id.
    pub documents: Vec<Document>,
    /// Distinct ids seen across both inputs before truncation.
    pub candidates: usize,
}

/// Fuse BM25 and semantic results using RRF.
///
/// Each output document carries its fused score; the per-source backend
/// scores are discarded. Documents with equal fused scores have no defined
/// relative order.
#[must_use]
pub fn fuse_results(
    lexical: &[Document],
    semantic: &[Document],
    config: &RrfConfig,
    top_k: usize,
) -> FusedList {
    let mut acc = FusionAccumulator::default();
    acc.fold(lexical, config);
    acc.fold(semantic, config);

    trace!(
        target: "fusion",
        lexical = lexical.len(),
        semantic = semantic.len(),
        distinct = acc.seen.len(),
        k = config.k,
        "lists folded"
    );

    acc.into_ranked(top_k)
}
