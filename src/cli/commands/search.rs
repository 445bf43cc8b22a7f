//! asearch search - Run one search request

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::search::engine::SearchEngine;
use crate::search::types::{RetrievalMode, SearchOutcome, SearchRequest, SortOverride, WeightPair};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Retrieval mode: bm25, semantic, hybrid, rrf
    #[arg(long, short)]
    pub mode: Option<RetrievalMode>,

    /// Maximum number of results (1-100)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// BM25 weight for hybrid mode (0-1)
    #[arg(long)]
    pub lexical_weight: Option<f64>,

    /// Vector weight for hybrid mode (0-1)
    #[arg(long)]
    pub vector_weight: Option<f64>,

    /// Re-order results: relevance, date_desc, date_asc, title_asc
    #[arg(long, short)]
    pub sort: Option<SortOverride>,

    /// Skip spelling correction
    #[arg(long)]
    pub no_spell_check: bool,

    /// Session identifier stored with the search log
    #[arg(long)]
    pub session: Option<String>,
}

impl SearchArgs {
    /// Merge flags over the configured defaults.
    #[must_use]
    pub fn to_request(&self, ctx: &AppContext) -> SearchRequest {
        let defaults = &ctx.config.search;
        let mut request = SearchRequest::new(
            self.query.clone(),
            self.mode.unwrap_or(defaults.default_mode),
        )
        .with_top_k(self.top_k.unwrap_or(defaults.top_k))
        .with_sort(self.sort.unwrap_or(defaults.default_sort))
        .with_spell_check(defaults.spell_check && !self.no_spell_check);

        if self.lexical_weight.is_some() || self.vector_weight.is_some() {
            request = request.with_weights(WeightPair::new(
                self.lexical_weight.unwrap_or(defaults.lexical_weight),
                self.vector_weight.unwrap_or(defaults.vector_weight),
            ));
        }
        if let Some(session) = &self.session {
            request = request.with_session(session.clone());
        }
        request
    }
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let engine = ctx.engine()?;
    run_with_engine(ctx, &engine, args)
}

pub fn run_with_engine(ctx: &AppContext, engine: &SearchEngine, args: &SearchArgs) -> Result<()> {
    let outcome = engine.search(&args.to_request(ctx))?;

    if ctx.robot_mode {
        let mut response = robot_ok(&outcome);
        if outcome.processed.was_corrected {
            response = response.with_warning(format!(
                "query corrected to \"{}\"",
                outcome.processed.text
            ));
        }
        return emit_robot(&response);
    }

    emit_human(render(&outcome));
    Ok(())
}

fn render(outcome: &SearchOutcome) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!("Results for \"{}\"", outcome.query));
    if outcome.processed.was_corrected {
        layout.kv("Searched for", &outcome.processed.text);
    }
    layout
        .kv("Mode", outcome.mode.as_str())
        .kv("Sort", outcome.sort.as_str())
        .kv("Matches", &outcome.total_matches.to_string())
        .blank();

    if outcome.is_empty() {
        layout.push_line("No matching articles.");
        return layout;
    }

    for (position, doc) in outcome.results.iter().enumerate() {
        let title = doc.title.as_deref().unwrap_or("(untitled)");
        layout.push_line(format!(
            "{:>3}. {title}  [{}]  score {:.4}",
            position + 1,
            doc.id,
            doc.score
        ));
        if let Some(date) = &doc.published_at {
            layout.push_line(format!("     {date}"));
        }
        if let Some(excerpt) = &doc.excerpt {
            layout.push_line(format!("     {excerpt}"));
        }
    }
    if let Some(id) = outcome.search_log_id {
        layout.blank().kv("Search log id", &id.to_string());
    }
    layout
}
