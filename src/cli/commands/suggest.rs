//! asearch suggest - Title autocomplete

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Text typed so far
    pub prefix: String,

    /// Maximum number of suggestions
    #[arg(long, short, default_value = "10")]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let cache = ctx.suggestions()?;
    let suggestions = cache.suggest(&args.prefix, args.limit);

    if ctx.robot_mode {
        return emit_robot(&robot_ok(json!({
            "prefix": args.prefix,
            "suggestions": suggestions,
            "snapshot": cache.info(),
        })));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Suggestions for \"{}\"", args.prefix));
    if suggestions.is_empty() {
        layout.push_line("No matching titles.");
    }
    for title in &suggestions {
        layout.bullet(title);
    }
    emit_human(layout);
    Ok(())
}
