//! article-search: hybrid lexical/semantic article retrieval
//!
//! Queries are normalized and spell-corrected, translated into backend
//! requests for one of four retrieval modes, and (for RRF) fused in-process.
//! Searches and user feedback are logged to SQLite for offline analytics.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod query;
pub mod search;
pub mod storage;
pub mod suggest;
pub mod telemetry;
pub mod test_utils;

pub use error::{Result, SearchError};
