//! Cross-module tests: HTTP clients against mock servers, the engine over
//! fakes and SQLite, and suggestion loading.

mod backend_tests;
mod embedder_tests;
mod engine_tests;
mod suggest_tests;
mod telemetry_tests;
