use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::search::fusion::DEFAULT_RRF_K;
use crate::search::strategy::VectorQueryKind;
use crate::search::types::{MAX_TOP_K, MIN_TOP_K, RetrievalMode, SortOverride};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

impl Config {
    /// Defaults, then global and project files (or one explicit file), then
    /// `ASEARCH_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("ASEARCH_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SearchError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)
            .map_err(|err| SearchError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    /// Path of the user-wide config file, if the platform has a config dir.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("asearch/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        let path = root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SearchError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SearchError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.backend {
            self.backend.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.query {
            self.query.merge(patch);
        }
        if let Some(patch) = patch.telemetry {
            self.telemetry.merge(patch);
        }
        if let Some(patch) = patch.suggest {
            self.suggest.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(&|key| std::env::var(key).ok())
    }

    /// Apply `ASEARCH_*` overrides read through `lookup`.
    pub(crate) fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        let env = EnvReader { lookup };

        if let Some(value) = env.string("ASEARCH_BACKEND_URL") {
            self.backend.url = value;
        }
        if let Some(value) = env.string("ASEARCH_COLLECTION") {
            self.backend.collection = value;
        }
        if let Some(value) = env.parsed::<u64>("ASEARCH_BACKEND_TIMEOUT")? {
            self.backend.timeout_secs = value;
        }

        if let Some(value) = env.string("ASEARCH_MODE") {
            self.search.default_mode = value
                .parse()
                .map_err(|err| SearchError::Config(format!("invalid ASEARCH_MODE: {err}")))?;
        }
        if let Some(value) = env.parsed::<usize>("ASEARCH_TOP_K")? {
            self.search.top_k = value;
        }
        if let Some(value) = env.parsed::<f64>("ASEARCH_LEXICAL_WEIGHT")? {
            self.search.lexical_weight = value;
        }
        if let Some(value) = env.parsed::<f64>("ASEARCH_VECTOR_WEIGHT")? {
            self.search.vector_weight = value;
        }
        if let Some(value) = env.parsed::<f64>("ASEARCH_RRF_K")? {
            self.search.rrf_k = value;
        }
        if let Some(value) = env.bool("ASEARCH_SPELL_CHECK")? {
            self.search.spell_check = value;
        }

        if let Some(value) = env.string("ASEARCH_EMBEDDING_PROVIDER") {
            self.embedding.provider = parse_provider(&value)?;
        }
        if let Some(value) = env.string("ASEARCH_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = Some(value);
        }
        if let Some(value) = env.parsed::<usize>("ASEARCH_EMBEDDING_DIMS")? {
            self.embedding.dims = value;
        }

        if let Some(value) = env.string("ASEARCH_DICTIONARY") {
            self.query.dictionary_path = Some(PathBuf::from(value));
        }

        if let Some(value) = env.bool("ASEARCH_TELEMETRY")? {
            self.telemetry.enabled = value;
        }
        if let Some(value) = env.string("ASEARCH_TELEMETRY_DB") {
            self.telemetry.db_path = Some(PathBuf::from(value));
        }

        if let Some(value) = env.string("ASEARCH_SUGGEST_SOURCE") {
            self.suggest.source = parse_suggest_source(&value)?;
        }
        if let Some(value) = env.string("ASEARCH_TITLES_PATH") {
            self.suggest.titles_path = Some(PathBuf::from(value));
        }

        Ok(())
    }

    /// Range checks on values a file or env override could get wrong.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&self.search.top_k) {
            return Err(SearchError::Config(format!(
                "search.top_k must be within [{MIN_TOP_K}, {MAX_TOP_K}], got {}",
                self.search.top_k
            )));
        }
        for (name, weight) in [
            ("search.lexical_weight", self.search.lexical_weight),
            ("search.vector_weight", self.search.vector_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(SearchError::Config(format!(
                    "{name} must be within [0, 1], got {weight}"
                )));
            }
        }
        if !(self.search.rrf_k.is_finite() && self.search.rrf_k > 0.0) {
            return Err(SearchError::Config(format!(
                "search.rrf_k must be positive, got {}",
                self.search.rrf_k
            )));
        }
        if self.embedding.dims == 0 {
            return Err(SearchError::Config("embedding.dims must be positive".to_string()));
        }
        if !(1..=2).contains(&self.query.max_edit_distance) {
            return Err(SearchError::Config(format!(
                "query.max_edit_distance must be 1 or 2, got {}",
                self.query.max_edit_distance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub collection: String,
    pub timeout_secs: u64,
    pub embedding_field: String,
    pub vector_query: VectorQueryKind,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            collection: "articles".to_string(),
            timeout_secs: 30,
            embedding_field: "embedding".to_string(),
            vector_query: VectorQueryKind::ScriptScore,
        }
    }
}

impl BackendConfig {
    fn merge(&mut self, patch: BackendPatch) {
        if let Some(value) = patch.url {
            self.url = value;
        }
        if let Some(value) = patch.collection {
            self.collection = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.embedding_field {
            self.embedding_field = value;
        }
        if let Some(value) = patch.vector_query {
            self.vector_query = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_mode: RetrievalMode,
    pub top_k: usize,
    pub lexical_weight: f64,
    pub vector_weight: f64,
    pub rrf_k: f64,
    pub spell_check: bool,
    pub default_sort: SortOverride,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: RetrievalMode::HybridWeighted,
            top_k: 10,
            lexical_weight: 0.5,
            vector_weight: 0.5,
            rrf_k: DEFAULT_RRF_K,
            spell_check: true,
            default_sort: SortOverride::Relevance,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.default_mode {
            self.default_mode = value;
        }
        if let Some(value) = patch.top_k {
            self.top_k = value;
        }
        if let Some(value) = patch.lexical_weight {
            self.lexical_weight = value;
        }
        if let Some(value) = patch.vector_weight {
            self.vector_weight = value;
        }
        if let Some(value) = patch.rrf_k {
            self.rrf_k = value;
        }
        if let Some(value) = patch.spell_check {
            self.spell_check = value;
        }
        if let Some(value) = patch.default_sort {
            self.default_sort = value;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Local feature-hashing embedder; no model server needed
    #[default]
    Hash,
    /// Remote model server
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub endpoint: Option<String>,
    pub dims: usize,
    /// Zero disables the query embedding cache.
    pub cache_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            endpoint: None,
            dims: 384,
            cache_size: 1024,
            timeout_secs: 10,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.provider {
            self.provider = value;
        }
        if let Some(value) = patch.endpoint {
            self.endpoint = Some(value);
        }
        if let Some(value) = patch.dims {
            self.dims = value;
        }
        if let Some(value) = patch.cache_size {
            self.cache_size = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub dictionary_path: Option<PathBuf>,
    pub max_edit_distance: u8,
    /// Non-alphanumeric characters that survive stripping.
    pub keep_chars: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            max_edit_distance: 2,
            keep_chars: "-'".to_string(),
        }
    }
}

impl QueryConfig {
    fn merge(&mut self, patch: QueryPatch) {
        if let Some(value) = patch.dictionary_path {
            self.dictionary_path = Some(value);
        }
        if let Some(value) = patch.max_edit_distance {
            self.max_edit_distance = value;
        }
        if let Some(value) = patch.keep_chars {
            self.keep_chars = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Defaults to `<root>/feedback.db`.
    pub db_path: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
        }
    }
}

impl TelemetryConfig {
    fn merge(&mut self, patch: TelemetryPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.db_path {
            self.db_path = Some(value);
        }
    }

    #[must_use]
    pub fn resolved_db_path(&self, root: &Path) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| root.join("feedback.db"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestSourceKind {
    #[default]
    Backend,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    pub source: SuggestSourceKind,
    pub titles_path: Option<PathBuf>,
    pub max_titles: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            source: SuggestSourceKind::Backend,
            titles_path: None,
            max_titles: 5000,
        }
    }
}

impl SuggestConfig {
    fn merge(&mut self, patch: SuggestPatch) {
        if let Some(value) = patch.source {
            self.source = value;
        }
        if let Some(value) = patch.titles_path {
            self.titles_path = Some(value);
        }
        if let Some(value) = patch.max_titles {
            self.max_titles = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub backend: Option<BackendPatch>,
    pub search: Option<SearchPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub query: Option<QueryPatch>,
    pub telemetry: Option<TelemetryPatch>,
    pub suggest: Option<SuggestPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BackendPatch {
    pub url: Option<String>,
    pub collection: Option<String>,
    pub timeout_secs: Option<u64>,
    pub embedding_field: Option<String>,
    pub vector_query: Option<VectorQueryKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub default_mode: Option<RetrievalMode>,
    pub top_k: Option<usize>,
    pub lexical_weight: Option<f64>,
    pub vector_weight: Option<f64>,
    pub rrf_k: Option<f64>,
    pub spell_check: Option<bool>,
    pub default_sort: Option<SortOverride>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EmbeddingPatch {
    pub provider: Option<EmbeddingProvider>,
    pub endpoint: Option<String>,
    pub dims: Option<usize>,
    pub cache_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QueryPatch {
    pub dictionary_path: Option<PathBuf>,
    pub max_edit_distance: Option<u8>,
    pub keep_chars: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TelemetryPatch {
    pub enabled: Option<bool>,
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SuggestPatch {
    pub source: Option<SuggestSourceKind>,
    pub titles_path: Option<PathBuf>,
    pub max_titles: Option<usize>,
}

fn parse_provider(value: &str) -> Result<EmbeddingProvider> {
    match value.trim().to_lowercase().as_str() {
        "hash" => Ok(EmbeddingProvider::Hash),
        "http" => Ok(EmbeddingProvider::Http),
        other => Err(SearchError::Config(format!(
            "invalid embedding provider {other:?} (expected hash|http)"
        ))),
    }
}

fn parse_suggest_source(value: &str) -> Result<SuggestSourceKind> {
    match value.trim().to_lowercase().as_str() {
        "backend" => Ok(SuggestSourceKind::Backend),
        "file" => Ok(SuggestSourceKind::File),
        other => Err(SearchError::Config(format!(
            "invalid suggestion source {other:?} (expected backend|file)"
        ))),
    }
}

struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl EnvReader<'_> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.string(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(SearchError::Config(format!("invalid {key} value {value}"))),
            },
            None => Ok(None),
        }
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                SearchError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }
}
