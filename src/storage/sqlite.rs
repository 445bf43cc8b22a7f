//! SQLite database layer

use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::storage::migrations;

/// SQLite database wrapper for search logs and feedback
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        Self::init(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}
