//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod analytics;
pub mod config;
pub mod feedback;
pub mod health;
pub mod search;
pub mod suggest;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search articles
    Search(search::SearchArgs),

    /// Record thumbs-up/down feedback on a result
    Feedback(feedback::FeedbackArgs),

    /// Summarize recent searches and feedback
    Analytics(analytics::AnalyticsArgs),

    /// Autocomplete article titles
    Suggest(suggest::SuggestArgs),

    /// Check backend, collection and embedder
    Health(health::HealthArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),
}

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::Feedback(args) => feedback::run(ctx, args),
        Commands::Analytics(args) => analytics::run(ctx, args),
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::Health(args) => health::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}
