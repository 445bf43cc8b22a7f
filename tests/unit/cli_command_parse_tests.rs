use clap::Parser;

use article_search::cli::{Cli, Commands, OutputFormat};
use article_search::search::{RetrievalMode, SortOverride};
use article_search::telemetry::Rating;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["asearch"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[test]
fn parse_search_flags() {
    match parse(&[
        "search",
        "healthcare policy",
        "--mode",
        "rrf",
        "--top-k",
        "5",
        "--sort",
        "title_asc",
        "--no-spell-check",
    ])
    .command
    {
        Commands::Search(args) => {
            assert_eq!(args.query, "healthcare policy");
            assert_eq!(args.mode, Some(RetrievalMode::HybridRrf));
            assert_eq!(args.top_k, Some(5));
            assert_eq!(args.sort, Some(SortOverride::TitleAsc));
            assert!(args.no_spell_check);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_feedback_flags() {
    match parse(&[
        "feedback",
        "--query",
        "tax",
        "--doc-id",
        "42",
        "--mode",
        "bm25",
        "--rating",
        "down",
        "--position",
        "3",
        "--log-id",
        "7",
    ])
    .command
    {
        Commands::Feedback(args) => {
            let record = args.to_record();
            assert_eq!(record.doc_id, "42");
            assert_eq!(record.mode, RetrievalMode::Lexical);
            assert_eq!(record.rating, Rating::Down);
            assert_eq!(record.position, 3);
            assert_eq!(record.search_log_id, Some(7));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_global_flags_after_subcommand() {
    let cli = parse(&["analytics", "--days", "30", "--robot", "-vv"]);
    assert_eq!(cli.output_format(), OutputFormat::Json);
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Analytics(args) => assert_eq!(args.days, 30),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_suggest_defaults() {
    match parse(&["suggest", "heal"]).command {
        Commands::Suggest(args) => {
            assert_eq!(args.prefix, "heal");
            assert_eq!(args.limit, 10);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_mode_is_rejected() {
    let result = Cli::try_parse_from(["asearch", "search", "q", "--mode", "fuzzy"]);
    assert!(result.is_err());
}
