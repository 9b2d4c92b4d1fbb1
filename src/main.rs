mod analysis;
mod clients;
mod config;
mod credentials;
mod error;
mod language;
mod models;
mod pipeline;
mod plagiarism;
mod prompt;
mod report;
mod routes;
mod state;
mod storage;
mod templates;

use clap::{ArgAction, Parser};

use crate::pipeline::AuditOptions;
use crate::plagiarism::ConsolidationOptions;

/// Detect suspicious activity and plagiarism in an omegaUp contest.
#[derive(Parser, Debug)]
#[command(name = "contest-audit", version, long_about = None)]
struct Cli {
    /// Contest alias. Prompted for when omitted.
    #[arg(short, long)]
    contest: Option<String>,

    /// Problem alias, or "all". Prompted for when omitted.
    #[arg(short, long)]
    problem: Option<String>,

    /// Only run the suspicious-activity checks.
    #[arg(long)]
    skip_plagiarism: bool,

    /// Minimum Moss similarity (percent) to report.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_similarity: Option<u8>,

    /// Only report matches between contestants of different schools.
    #[arg(long)]
    cross_school_only: bool,

    /// Serve the report locally once it is written.
    #[arg(long)]
    serve: bool,

    /// Increase log verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "contest_audit=info,tower_http=info",
        _ => "contest_audit=debug,tower_http=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let options = AuditOptions {
        contest: cli.contest,
        problem: cli.problem,
        check_plagiarism: !cli.skip_plagiarism,
        consolidation: ConsolidationOptions {
            min_similarity: cli.min_similarity.unwrap_or(config.min_similarity),
            cross_school_only: cli.cross_school_only,
        },
        serve: cli.serve,
    };

    pipeline::run(config, options).await
}
