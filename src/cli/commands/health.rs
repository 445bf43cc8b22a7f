//! asearch health - Backend and embedder checks

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SearchError};
use crate::search::backend::SearchBackend;

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Exit non-zero when any check fails
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub backend_url: String,
    pub reachable: bool,
    pub cluster_name: Option<String>,
    pub version: Option<String>,
    pub collection: String,
    pub collection_exists: Option<bool>,
    pub embedder: String,
    pub embedding_dims: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

impl HealthReport {
    #[must_use]
    pub fn healthy(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Collect the report; backend failures become problems, not errors.
pub fn check(ctx: &AppContext, backend: &dyn SearchBackend) -> Result<HealthReport> {
    let embedder = ctx.embedder()?;
    let collection = ctx.config.backend.collection.clone();
    let mut problems = Vec::new();

    let info = backend
        .info()
        .inspect_err(|err| problems.push(err.to_string()))
        .ok();
    let collection_exists = if info.is_some() {
        match backend.exists(&collection) {
            Ok(true) => Some(true),
            Ok(false) => {
                problems.push(format!("collection '{collection}' does not exist"));
                Some(false)
            }
            Err(err) => {
                problems.push(err.to_string());
                None
            }
        }
    } else {
        None
    };

    Ok(HealthReport {
        backend_url: ctx.config.backend.url.clone(),
        reachable: info.is_some(),
        cluster_name: info.as_ref().map(|i| i.cluster_name.clone()),
        version: info.and_then(|i| i.version),
        collection,
        collection_exists,
        embedder: embedder.name().to_string(),
        embedding_dims: embedder.dims(),
        problems,
    })
}

pub fn run(ctx: &AppContext, args: &HealthArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let report = check(ctx, backend.as_ref())?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(&report))?;
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Health")
            .kv("Backend", &report.backend_url)
            .kv("Reachable", &report.reachable.to_string())
            .kv("Cluster", report.cluster_name.as_deref().unwrap_or("-"))
            .kv("Version", report.version.as_deref().unwrap_or("-"))
            .kv("Collection", &report.collection)
            .kv(
                "Collection exists",
                &report
                    .collection_exists
                    .map_or_else(|| "unknown".to_string(), |v| v.to_string()),
            )
            .kv("Embedder", &format!("{} ({} dims)", report.embedder, report.embedding_dims));
        if !report.problems.is_empty() {
            layout.blank().section("Problems");
            for problem in &report.problems {
                layout.bullet(problem);
            }
        }
        emit_human(layout);
    }

    if args.strict && !report.healthy() {
        return Err(SearchError::BackendUnavailable(report.problems.join("; ")));
    }
    Ok(())
}
