//! Search and feedback telemetry
//!
//! The search path only ever appends records through [`TelemetrySink`];
//! nothing written here is read back while serving a query. Analytics read
//! the same store offline.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::search::types::{RetrievalMode, SortOverride};
use crate::storage::Database;

pub mod analytics;

pub use analytics::AnalyticsReport;

/// Timestamp layout stored in SQLite; sorts lexically and works with `DATE()`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One executed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchLogRecord {
    pub query: String,
    pub processed_query: Option<String>,
    pub mode: RetrievalMode,
    pub sort: SortOverride,
    pub total_matches: u64,
    pub returned: usize,
    pub session_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// Thumbs up / thumbs down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = SearchError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(SearchError::InvalidParameter(format!(
                "rating must be +1 or -1, got {other}"
            ))),
        }
    }
}

impl FromStr for Rating {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+1" | "1" | "helpful" => Ok(Self::Up),
            "down" | "-1" | "unhelpful" => Ok(Self::Down),
            other => Err(SearchError::InvalidParameter(format!(
                "rating must be up or down, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// A user's judgement of one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub query: String,
    pub doc_id: String,
    pub doc_title: Option<String>,
    pub mode: RetrievalMode,
    pub rating: Rating,
    /// 1-based position of the result in the list the user saw.
    pub position: u32,
    pub search_log_id: Option<i64>,
    pub session_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidParameter(
                "feedback query must not be empty".to_string(),
            ));
        }
        if self.doc_id.trim().is_empty() {
            return Err(SearchError::InvalidParameter(
                "feedback doc_id must not be empty".to_string(),
            ));
        }
        if self.position == 0 {
            return Err(SearchError::InvalidParameter(
                "result position is 1-based".to_string(),
            ));
        }
        Ok(())
    }
}

/// Append-only destination for search and feedback events.
pub trait TelemetrySink: Send + Sync {
    /// Returns the new search log id.
    fn log_search(&self, record: &SearchLogRecord) -> Result<i64>;

    /// Returns the new feedback id.
    fn log_feedback(&self, record: &FeedbackRecord) -> Result<i64>;
}

/// SQLite-backed telemetry store.
pub struct SqliteTelemetry {
    db: Mutex<Database>,
}

impl SqliteTelemetry {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Aggregate the last `days` days of searches and feedback.
    ///
    /// A window reaching past the representable calendar covers all time.
    pub fn analytics(&self, days: u32) -> Result<AnalyticsReport> {
        let since = chrono::Duration::try_days(i64::from(days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let db = self.db.lock();
        analytics::collect(db.conn(), since)
    }
}

impl TelemetrySink for SqliteTelemetry {
    fn log_search(&self, record: &SearchLogRecord) -> Result<i64> {
        let db = self.db.lock();
        db.conn().execute(
            "INSERT INTO search_logs
             (query, processed_query, search_type, sort_by, total_results, results_returned, timestamp, session_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.query,
                record.processed_query,
                record.mode.as_str(),
                record.sort.as_str(),
                i64::try_from(record.total_matches).unwrap_or(i64::MAX),
                i64::try_from(record.returned).unwrap_or(i64::MAX),
                record.at.format(TIMESTAMP_FORMAT).to_string(),
                record.session_id,
            ],
        )?;
        let id = db.conn().last_insert_rowid();
        debug!(target: "telemetry", id, mode = %record.mode, "search logged");
        Ok(id)
    }

    fn log_feedback(&self, record: &FeedbackRecord) -> Result<i64> {
        record.validate()?;
        let db = self.db.lock();
        db.conn().execute(
            "INSERT INTO feedback
             (search_log_id, query, doc_id, doc_title, search_type, rating, result_position, timestamp, session_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.search_log_id,
                record.query,
                record.doc_id,
                record.doc_title,
                record.mode.as_str(),
                record.rating.value(),
                record.position,
                record.at.format(TIMESTAMP_FORMAT).to_string(),
                record.session_id,
            ],
        )?;
        let id = db.conn().last_insert_rowid();
        debug!(target: "telemetry", id, rating = %record.rating, "feedback logged");
        Ok(id)
    }
}
