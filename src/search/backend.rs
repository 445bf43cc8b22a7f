//! Search backend boundary
//!
//! The document store and its full-text/vector index are external; the core
//! only needs to run an opaque query body and check that a collection exists.

use serde::Serialize;

use crate::error::Result;
use crate::search::strategy::QuerySpec;
use crate::search::types::Document;

/// Ordered hits for one executed query, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendHits {
    /// Total matches the backend reports, which may exceed `hits.len()`.
    pub total: u64,
    pub hits: Vec<Document>,
}

/// Cluster identity reported by a health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    pub cluster_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// An indexed document store queried by body.
///
/// Implementations map transport and missing-collection failures to
/// [`crate::SearchError::BackendUnavailable`]. Calls may come from several
/// threads at once.
pub trait SearchBackend: Send + Sync {
    fn execute(&self, collection: &str, spec: &QuerySpec) -> Result<BackendHits>;

    fn exists(&self, collection: &str) -> Result<bool>;

    fn info(&self) -> Result<ClusterInfo>;
}
