//! Unit-level tests against the public API.

mod cli_command_parse_tests;
mod config_tests;
mod fusion_tests;
mod query_tests;
mod strategy_tests;
