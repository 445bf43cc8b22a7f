//! Versioned schema migrations for the telemetry database.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Latest schema version.
pub const SCHEMA_VERSION: u32 = 2;

const MIGRATIONS: [(u32, &str); 2] = [
    (
        1,
        "CREATE TABLE IF NOT EXISTS search_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            processed_query TEXT,
            search_type TEXT NOT NULL,
            sort_by TEXT,
            total_results INTEGER,
            results_returned INTEGER,
            timestamp TEXT NOT NULL,
            session_id TEXT
        );
        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_log_id INTEGER,
            query TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            doc_title TEXT,
            search_type TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating IN (-1, 1)),
            result_position INTEGER,
            timestamp TEXT NOT NULL,
            session_id TEXT,
            FOREIGN KEY (search_log_id) REFERENCES search_logs(id)
        );",
    ),
    (
        2,
        "CREATE INDEX IF NOT EXISTS idx_search_logs_timestamp ON search_logs(timestamp);
         CREATE INDEX IF NOT EXISTS idx_search_logs_query ON search_logs(query);
         CREATE INDEX IF NOT EXISTS idx_feedback_timestamp ON feedback(timestamp);
         CREATE INDEX IF NOT EXISTS idx_feedback_rating ON feedback(rating);",
    ),
];

/// Apply every migration newer than the stored `user_version`.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

    for (version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        debug!(target: "telemetry", version, "schema migration applied");
    }

    Ok(SCHEMA_VERSION.max(current))
}
