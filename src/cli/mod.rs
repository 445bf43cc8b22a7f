//! Command-line surface for `asearch`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub mod commands;
pub mod output;

pub use commands::Commands;

/// Hybrid article search over an OpenSearch collection.
#[derive(Parser, Debug)]
#[command(name = "asearch", version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Explicit config file (skips global and project config)
    #[arg(long, global = true, env = "ASEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Machine-readable JSON output (same as --format json)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}
