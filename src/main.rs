mod config;
mod github;
mod pr;
mod report;

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Stats: summarizes a repository's recently opened and closed pull
/// requests: size class, lines changed and the subdirectories they touch.
#[derive(Parser, Debug)]
#[command(name = "pr-stats", version, about)]
struct Cli {
    /// Repository as owner/repo or https://github.com/owner/repo
    ///
    /// Falls back to `query.repo` from the config file.
    repo: Option<String>,

    /// Only include activity after this RFC 3339 instant (e.g., 2016-03-01T00:00:00Z)
    #[arg(long, conflicts_with = "hours")]
    since: Option<DateTime<Utc>>,

    /// Only include activity from the last N hours (default: query.since_hours, or 24)
    #[arg(long)]
    hours: Option<i64>,

    /// Config file path (default: .pr-stats.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Optional output file path for markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;

    let repo_arg = cli.repo.clone().or_else(|| config.query.repo.clone()).ok_or(
        "Repository is required. Usage: pr-stats <owner/repo> or set query.repo in .pr-stats.toml",
    )?;
    let repo = pr::parse_repo(&repo_arg)?;

    let since = match cli.since {
        Some(since) => since,
        None => config.cutoff(cli.hours, Utc::now())?,
    };

    let _main_span = info_span!("pr_stats", repo = %repo).entered();
    debug!(since = %since.to_rfc3339(), api_base = config.api_base(), "resolved query");

    let ignore = config.ignore_set()?;
    let transport = github::HttpTransport::new(config.github_token());

    info!("fetching pull requests from GitHub");
    let prs = pr::query(
        &transport,
        config.api_base(),
        &repo,
        since,
        &ignore,
        &pr::LogProgress,
    )
    .await?;
    info!(open = prs.open.len(), closed = prs.closed.len(), "fetched pull requests");

    info!("generating report");
    let built_report = report::build(&prs, &repo, since);
    report::output(&built_report, cli.output.as_deref())?;
    info!(total_changes = built_report.total_changes, "done");

    Ok(())
}
