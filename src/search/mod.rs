//! Article search
//!
//! Four retrieval modes over one backend collection: BM25 (lexical), vector
//! similarity (semantic), a weighted single-query hybrid, and reciprocal
//! rank fusion of separate lexical and semantic queries.

pub mod backend;
pub mod cache;
pub mod embeddings;
pub mod engine;
pub mod fusion;
pub mod opensearch;
pub mod sort;
pub mod strategy;
pub mod types;

pub use backend::{BackendHits, ClusterInfo, SearchBackend};
pub use cache::CachedEmbedder;
pub use embeddings::{Embedder, HashEmbedder, HttpEmbedder};
pub use engine::{EngineConfig, SearchEngine};
pub use fusion::{FusedList, RrfConfig, fuse_results};
pub use opensearch::OpenSearchClient;
pub use strategy::{QueryPlan, QuerySpec, StrategyOptions, VectorQueryKind, build_plan};
pub use types::{
    Document, RetrievalMode, SearchOutcome, SearchRequest, SortOverride, WeightPair,
};
