//! Error types for article-search

use thiserror::Error;

/// Result type alias using [`SearchError`]
pub type Result<T> = std::result::Result<T, SearchError>;

/// Every failure a search, feedback or analytics call can report.
///
/// "No results" is never an error: a successful search with an empty
/// result list is `Ok`.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailure(String),

    #[error("Fusion input mismatch: {failed} sub-query failed: {reason}")]
    FusionInputMismatch { failed: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Stable machine-readable code for robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::EmbeddingFailure(_) => "embedding_failure",
            Self::FusionInputMismatch { .. } => "fusion_input_mismatch",
            Self::Config(_) => "config_error",
            Self::MissingConfig(_) => "missing_config",
            Self::Telemetry(_) => "telemetry_error",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io_error",
            Self::Database(_) => "database_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the same request may succeed if simply issued again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable(_) | Self::FusionInputMismatch { .. }
        )
    }
}
