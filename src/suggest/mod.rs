//! Title autocomplete
//!
//! A [`SuggestionCache`] holds one immutable [`TitleSnapshot`]. Readers
//! clone the `Arc` and match against it without holding the lock; a reload
//! builds the replacement first and swaps it in whole.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;

pub mod source;

pub use source::{BackendTitleSource, FileTitleSource, SuggestionSource};

/// Immutable set of known titles, in stored order.
#[derive(Debug, Clone)]
pub struct TitleSnapshot {
    titles: Vec<String>,
    lowered: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl TitleSnapshot {
    /// Exact duplicates are dropped, keeping the first occurrence.
    pub fn new(titles: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let titles: Vec<String> = titles
            .into_iter()
            .filter(|title| seen.insert(title.clone()))
            .collect();
        let lowered = titles.iter().map(|t| t.to_lowercase()).collect();
        Self {
            titles,
            lowered,
            loaded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// First `limit` titles containing `fragment`, case-insensitively.
    #[must_use]
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<String> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }
        self.lowered
            .iter()
            .zip(&self.titles)
            .filter(|(lowered, _)| lowered.contains(&needle))
            .map(|(_, title)| title.clone())
            .take(limit)
            .collect()
    }
}

/// Summary of the current snapshot for status output.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub titles: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Concurrently readable title cache with whole-snapshot reloads.
pub struct SuggestionCache {
    current: RwLock<Arc<TitleSnapshot>>,
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(TitleSnapshot::empty())
    }
}

impl SuggestionCache {
    #[must_use]
    pub fn new(snapshot: TitleSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot readers currently see.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TitleSnapshot> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn info(&self) -> SnapshotInfo {
        let snapshot = self.snapshot();
        SnapshotInfo {
            titles: snapshot.len(),
            loaded_at: snapshot.loaded_at(),
        }
    }

    /// Replace the snapshot with one built from `source`.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self, source: &dyn SuggestionSource) -> Result<usize> {
        let titles = source.list_titles().inspect_err(|err| {
            warn!(target: "suggest", source = source.name(), error = %err, "title reload failed");
        })?;
        let next = Arc::new(TitleSnapshot::new(titles));
        let count = next.len();
        *self.current.write() = next;
        info!(target: "suggest", source = source.name(), count, "suggestion snapshot swapped");
        Ok(count)
    }

    #[must_use]
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<String> {
        self.snapshot().suggest(fragment, limit)
    }
}
