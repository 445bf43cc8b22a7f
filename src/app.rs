use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, EmbeddingProvider, SuggestSourceKind};
use crate::error::{Result, SearchError};
use crate::query::{FrequencyDictionary, NoopDictionary, QueryProcessor, SpellDictionary};
use crate::search::backend::SearchBackend;
use crate::search::cache::CachedEmbedder;
use crate::search::embeddings::{Embedder, HashEmbedder, HttpEmbedder};
use crate::search::engine::{EngineConfig, SearchEngine};
use crate::search::fusion::RrfConfig;
use crate::search::opensearch::OpenSearchClient;
use crate::search::strategy::StrategyOptions;
use crate::search::types::WeightPair;
use crate::suggest::{BackendTitleSource, FileTitleSource, SuggestionCache, SuggestionSource};
use crate::telemetry::SqliteTelemetry;

/// Per-invocation state. Collaborators are built on demand so commands that
/// never touch the backend never open an HTTP client.
pub struct AppContext {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub robot_mode: bool,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = find_root()?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| default_config_path(&root));
        let config = Config::load(cli.config.as_deref(), &root)?;
        let output_format = cli.output_format();

        debug!(target: "search", root = %root.display(), "context ready");

        Ok(Self {
            root,
            config_path,
            config,
            robot_mode: output_format == OutputFormat::Json,
            output_format,
            verbosity: cli.verbose,
        })
    }

    /// Context over an explicit root and config, without touching the
    /// environment.
    #[must_use]
    pub fn with_config(root: PathBuf, config: Config, output_format: OutputFormat) -> Self {
        Self {
            config_path: root.join("config.toml"),
            root,
            config,
            robot_mode: output_format == OutputFormat::Json,
            output_format,
            verbosity: 0,
        }
    }

    pub fn backend(&self) -> Result<Arc<dyn SearchBackend>> {
        Ok(Arc::new(OpenSearchClient::from_config(&self.config.backend)?))
    }

    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        let config = &self.config.embedding;
        let embedder: Arc<dyn Embedder> = match config.provider {
            EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(config.dims)),
            EmbeddingProvider::Http => {
                let http = HttpEmbedder::from_config(config)?;
                if config.cache_size > 0 {
                    Arc::new(CachedEmbedder::new(http, config.cache_size))
                } else {
                    Arc::new(http)
                }
            }
        };
        Ok(embedder)
    }

    pub fn query_processor(&self) -> Result<QueryProcessor> {
        let config = &self.config.query;
        let dictionary: Arc<dyn SpellDictionary> = match &config.dictionary_path {
            Some(path) => Arc::new(FrequencyDictionary::load(
                &self.resolve(path),
                config.max_edit_distance,
            )?),
            None => Arc::new(NoopDictionary),
        };
        Ok(QueryProcessor::new(dictionary).with_keep_chars(config.keep_chars.chars()))
    }

    /// `None` when telemetry is disabled in config.
    pub fn telemetry(&self) -> Result<Option<Arc<SqliteTelemetry>>> {
        if !self.config.telemetry.enabled {
            return Ok(None);
        }
        let path = self.config.telemetry.resolved_db_path(&self.root);
        Ok(Some(Arc::new(SqliteTelemetry::open(path)?)))
    }

    /// Like [`Self::telemetry`], but an open failure is logged and search
    /// proceeds without a sink.
    fn telemetry_for_search(&self) -> Option<Arc<SqliteTelemetry>> {
        match self.telemetry() {
            Ok(sink) => sink,
            Err(err) => {
                warn!(target: "telemetry", error = %err, "telemetry store unavailable");
                None
            }
        }
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let search = &self.config.search;
        EngineConfig {
            collection: self.config.backend.collection.clone(),
            rrf: RrfConfig::new(search.rrf_k),
            strategy: StrategyOptions {
                embedding_field: self.config.backend.embedding_field.clone(),
                vector_query: self.config.backend.vector_query,
            },
            default_weights: WeightPair::new(search.lexical_weight, search.vector_weight),
        }
    }

    pub fn engine(&self) -> Result<SearchEngine> {
        self.engine_with_backend(self.backend()?)
    }

    pub fn engine_with_backend(&self, backend: Arc<dyn SearchBackend>) -> Result<SearchEngine> {
        let engine = SearchEngine::new(
            backend,
            self.embedder()?,
            Arc::new(self.query_processor()?),
            self.engine_config(),
        );
        Ok(match self.telemetry_for_search() {
            Some(sink) => engine.with_telemetry(sink),
            None => engine,
        })
    }

    pub fn suggestion_source(
        &self,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<Box<dyn SuggestionSource>> {
        let config = &self.config.suggest;
        match config.source {
            SuggestSourceKind::Backend => Ok(Box::new(BackendTitleSource::new(
                backend,
                self.config.backend.collection.clone(),
                config.max_titles,
            ))),
            SuggestSourceKind::File => {
                let path = config.titles_path.as_ref().ok_or_else(|| {
                    SearchError::MissingConfig(
                        "suggest.titles_path is required for the file source".to_string(),
                    )
                })?;
                Ok(Box::new(FileTitleSource::new(self.resolve(path))))
            }
        }
    }

    /// Load a suggestion cache from the configured source.
    pub fn suggestions(&self) -> Result<SuggestionCache> {
        let source = self.suggestion_source(self.backend()?)?;
        let cache = SuggestionCache::default();
        cache.reload(source.as_ref())?;
        Ok(cache)
    }

    /// Relative config paths are taken relative to the data root.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

fn find_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("ASEARCH_ROOT") {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir()?;
    if let Some(found) = find_upwards(&cwd, ".asearch") {
        return Ok(found);
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| SearchError::MissingConfig("data directory not found".to_string()))?;
    Ok(data_dir.join("asearch"))
}

fn default_config_path(root: &Path) -> PathBuf {
    if root.ends_with(".asearch") {
        root.join("config.toml")
    } else {
        Config::global_path().unwrap_or_else(|| root.join("config.toml"))
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_dir())
}
