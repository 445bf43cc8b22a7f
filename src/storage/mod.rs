//! Storage layer
//!
//! SQLite persistence for search logs and user feedback.

pub mod migrations;
pub mod sqlite;

pub use sqlite::Database;
