//! asearch analytics - Search and feedback report

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SearchError};
use crate::telemetry::AnalyticsReport;

#[derive(Args, Debug)]
pub struct AnalyticsArgs {
    /// Look-back window in days
    #[arg(long, default_value = "7")]
    pub days: u32,
}

pub fn run(ctx: &AppContext, args: &AnalyticsArgs) -> Result<()> {
    let store = ctx
        .telemetry()?
        .ok_or_else(|| SearchError::Telemetry("telemetry is disabled".to_string()))?;
    let report = store.analytics(args.days)?;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(&report));
    }
    emit_human(render(&report, args.days));
    Ok(())
}

fn render(report: &AnalyticsReport, days: u32) -> HumanLayout {
    let overview = &report.overview;
    let mut layout = HumanLayout::new();
    layout
        .title(&format!("Search analytics (last {days} days)"))
        .section("Overview")
        .kv("Searches", &overview.total_searches.to_string())
        .kv("Unique queries", &overview.unique_queries.to_string())
        .kv("Avg matches", &format!("{:.1}", overview.avg_total_matches))
        .kv("Avg returned", &format!("{:.1}", overview.avg_returned))
        .kv("Feedback", &overview.total_feedback.to_string())
        .kv("Satisfaction", &format!("{:.1}%", overview.satisfaction_rate))
        .blank();

    layout.section("Searches by mode");
    for (mode, count) in &report.searches_by_mode {
        let feedback = report
            .feedback_by_mode
            .get(mode)
            .map(|f| format!("  (+{} / -{})", f.positive, f.negative))
            .unwrap_or_default();
        layout.kv(mode, &format!("{count}{feedback}"));
    }
    layout.blank();

    layout.section("Top queries");
    for entry in &report.top_queries {
        layout.bullet(&format!("{} ({})", entry.query, entry.count));
    }
    layout.blank();

    if !report.zero_result_queries.is_empty() {
        layout.section("Queries with no results");
        for entry in &report.zero_result_queries {
            layout.bullet(&format!("{} ({})", entry.query, entry.count));
        }
        layout.blank();
    }

    for (heading, articles) in [
        ("Most helpful", &report.most_helpful),
        ("Least helpful", &report.least_helpful),
    ] {
        if articles.is_empty() {
            continue;
        }
        layout.section(heading);
        for article in articles {
            layout.bullet(&format!(
                "{} [{}] net {:+} over {}",
                article.doc_title, article.doc_id, article.net_rating, article.feedback_count
            ));
        }
        layout.blank();
    }

    layout.section("Searches per day");
    for day in &report.searches_per_day {
        layout.kv(&day.date, &day.count.to_string());
    }
    layout
}
