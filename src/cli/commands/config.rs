//! asearch config - Show the effective configuration

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SearchError};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print as TOML instead of a summary
    #[arg(long)]
    pub toml: bool,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    let config = &ctx.config;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(json!({
            "root": ctx.root.display().to_string(),
            "config_path": ctx.config_path.display().to_string(),
            "config": config,
        })));
    }

    if args.toml {
        let rendered = toml::to_string_pretty(config)
            .map_err(|err| SearchError::Config(format!("render config: {err}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Configuration")
        .kv("Data root", &ctx.root.display().to_string())
        .kv("Config file", &ctx.config_path.display().to_string())
        .blank()
        .section("Backend")
        .kv("URL", &config.backend.url)
        .kv("Collection", &config.backend.collection)
        .kv("Vector query", &format!("{:?}", config.backend.vector_query))
        .blank()
        .section("Search")
        .kv("Default mode", config.search.default_mode.as_str())
        .kv("Top k", &config.search.top_k.to_string())
        .kv(
            "Weights",
            &format!(
                "bm25 {:.2} / vector {:.2}",
                config.search.lexical_weight, config.search.vector_weight
            ),
        )
        .kv("RRF k", &config.search.rrf_k.to_string())
        .kv("Spell check", &config.search.spell_check.to_string())
        .blank()
        .section("Embedding")
        .kv("Provider", &format!("{:?}", config.embedding.provider))
        .kv("Dimensions", &config.embedding.dims.to_string())
        .blank()
        .section("Telemetry")
        .kv("Enabled", &config.telemetry.enabled.to_string())
        .kv(
            "Database",
            &config
                .telemetry
                .resolved_db_path(&ctx.root)
                .display()
                .to_string(),
        );
    emit_human(layout);
    Ok(())
}
