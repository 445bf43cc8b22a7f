//! asearch feedback - Rate a search result

use chrono::Utc;
use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SearchError};
use crate::search::types::RetrievalMode;
use crate::telemetry::{FeedbackRecord, Rating, TelemetrySink};

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Query the rated result came from
    #[arg(long)]
    pub query: String,

    /// Rated document id
    #[arg(long)]
    pub doc_id: String,

    /// Rated document title
    #[arg(long)]
    pub title: Option<String>,

    /// Mode the search ran in
    #[arg(long)]
    pub mode: RetrievalMode,

    /// up or down
    #[arg(long)]
    pub rating: Rating,

    /// 1-based position of the result
    #[arg(long)]
    pub position: u32,

    /// Search log id returned by the search
    #[arg(long)]
    pub log_id: Option<i64>,

    #[arg(long)]
    pub session: Option<String>,
}

impl FeedbackArgs {
    #[must_use]
    pub fn to_record(&self) -> FeedbackRecord {
        FeedbackRecord {
            query: self.query.clone(),
            doc_id: self.doc_id.clone(),
            doc_title: self.title.clone(),
            mode: self.mode,
            rating: self.rating,
            position: self.position,
            search_log_id: self.log_id,
            session_id: self.session.clone(),
            at: Utc::now(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<()> {
    let sink = ctx
        .telemetry()?
        .ok_or_else(|| SearchError::Telemetry("telemetry is disabled".to_string()))?;
    let record = args.to_record();
    let id = sink.log_feedback(&record)?;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(json!({
            "feedback_id": id,
            "doc_id": record.doc_id,
            "rating": record.rating,
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Feedback recorded")
        .kv("Feedback id", &id.to_string())
        .kv("Document", &record.doc_id)
        .kv("Rating", &record.rating.to_string());
    emit_human(layout);
    Ok(())
}
