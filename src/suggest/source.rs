//! Where known article titles come from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SearchError};
use crate::search::backend::SearchBackend;
use crate::search::strategy::QuerySpec;

/// Produces the full list of titles for a snapshot, in display order.
pub trait SuggestionSource: Send + Sync {
    fn list_titles(&self) -> Result<Vec<String>>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Loads titles from the search collection with a `match_all` query.
pub struct BackendTitleSource {
    backend: Arc<dyn SearchBackend>,
    collection: String,
    max_titles: usize,
}

impl BackendTitleSource {
    pub fn new(backend: Arc<dyn SearchBackend>, collection: impl Into<String>, max_titles: usize) -> Self {
        Self {
            backend,
            collection: collection.into(),
            max_titles,
        }
    }
}

impl SuggestionSource for BackendTitleSource {
    fn list_titles(&self) -> Result<Vec<String>> {
        let hits = self
            .backend
            .execute(&self.collection, &QuerySpec::titles(self.max_titles))?;
        let titles: Vec<String> = hits
            .hits
            .into_iter()
            .filter_map(|doc| doc.title)
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect();
        debug!(target: "suggest", collection = %self.collection, count = titles.len(), "titles fetched");
        Ok(titles)
    }

    fn name(&self) -> &str {
        "backend"
    }
}

/// Reads one title per line from a text file. Blank lines are skipped.
pub struct FileTitleSource {
    path: PathBuf,
}

impl FileTitleSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SuggestionSource for FileTitleSource {
    fn list_titles(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Err(SearchError::NotFound(format!(
                "titles file {}",
                self.path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    fn name(&self) -> &str {
        "file"
    }
}
