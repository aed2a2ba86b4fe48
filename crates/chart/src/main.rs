use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use issuestack::{aggregate, date_axis, ingest, rank_labels, KeywordTable};

mod github;
mod render;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Chart a GitHub repository's open/closed issues per label over time",
    long_about = None
)]
struct Cli {
    /// Repository owner (user or organization).
    owner: String,

    /// Repository name.
    repo: String,

    /// Only chart issues created on or before this date (YYYY-MM-DD).
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Output image path.
    #[arg(long, default_value = "issues.png")]
    output: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = github::Config::from_env();
    info!(owner = %cli.owner, repo = %cli.repo, "fetching issues");
    let raw = github::fetch_all_issues(&config, &cli.owner, &cli.repo)
        .with_context(|| format!("failed to fetch issues for {}/{}", cli.owner, cli.repo))?;
    info!(fetched = raw.len(), "fetch complete");

    let mut ingested = ingest(&raw)?;
    if let Some(until) = cli.until {
        ingested.records.retain(|r| r.created_at <= until);
    }
    let label_set = rank_labels(&ingested.labels, &KeywordTable::default());
    let dates = date_axis(&ingested.records, cli.until);
    let table = aggregate(&ingested.records, &label_set, &dates);
    info!(
        issues = ingested.records.len(),
        labels = label_set.len(),
        dates = dates.len(),
        "aggregated series"
    );

    let title = format!("{}/{} issues", cli.owner, cli.repo);
    render::render_chart(&cli.output, &title, &label_set, &ingested.colors, &table)
        .with_context(|| format!("failed to render chart to {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "wrote chart");
    Ok(())
}
