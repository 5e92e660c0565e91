pub mod types;

pub use types::{PrSummary, Report};

use crate::pr::stats::SizeClass;
use crate::pr::{PullRequest, PullRequests, RepoId};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

fn summarize(pr: &PullRequest, closed: bool) -> PrSummary {
    PrSummary {
        number: pr.number,
        title: pr.title.clone(),
        author: pr.user.login.clone(),
        html_url: pr.html_url.clone(),
        class: pr.class(),
        total_changes: pr.total_changes(),
        additions: pr.files.iter().map(|f| f.additions).sum(),
        deletions: pr.files.iter().map(|f| f.deletions).sum(),
        comments: pr.comments + pr.review_comments,
        subdirectories: pr
            .subdirectories()
            .iter()
            .map(|sd| (sd.name.to_string(), sd.total_changes()))
            .collect(),
        created_at: pr.created_at_str(),
        closed_at: closed.then(|| pr.closed_at_str()),
        merged_at: (pr.merged || pr.merged_at.is_some()).then(|| pr.merged_at_str()),
    }
}

/// Build a Report from enriched pull requests.
pub fn build(prs: &PullRequests, repo: &RepoId, since: DateTime<Utc>) -> Report {
    let open: Vec<PrSummary> = prs.open.iter().map(|pr| summarize(pr, false)).collect();
    let closed: Vec<PrSummary> = prs.closed.iter().map(|pr| summarize(pr, true)).collect();
    let total_changes = open.iter().chain(&closed).map(|pr| pr.total_changes).sum();

    Report {
        repo: repo.to_string(),
        since: since.to_rfc3339(),
        open,
        closed,
        total_changes,
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(repo = %report.repo))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

/// Render a count with thousands separators, e.g. 1234567 -> "1,234,567".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn subdirectory_list(pr: &PrSummary) -> String {
    pr.subdirectories
        .iter()
        .map(|(name, changes)| format!("{} ({})", name, format_count(*changes)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_terminal_report(report: &Report) {
    println!();
    println!("{} pull requests since {}", report.repo.bold(), report.since);
    println!(
        "{} open | {} closed ({} merged) | {} changes",
        format_count(report.open.len() as u64),
        format_count(report.closed.len() as u64),
        format_count(report.merged_count() as u64),
        format_count(report.total_changes)
    );
    println!();

    print_section("Open", &report.open);
    print_section("Closed", &report.closed);
}

fn print_section(heading: &str, prs: &[PrSummary]) {
    println!("═══ {} ({}) ═══", heading, prs.len());
    if prs.is_empty() {
        println!("  None.");
    }
    for pr in prs {
        println!(
            "  {} #{} {} ({})",
            colorize_class(pr.class),
            pr.number,
            pr.title,
            pr.author
        );
        let when = match (&pr.merged_at, &pr.closed_at) {
            (Some(merged), _) => format!("opened {}, merged {}", pr.created_at, merged),
            (None, Some(closed)) => format!("opened {}, closed {}", pr.created_at, closed),
            (None, None) => format!("opened {}", pr.created_at),
        };
        println!(
            "      {} | {} changes (+{} -{}) | {} comments",
            when,
            format_count(pr.total_changes),
            format_count(pr.additions),
            format_count(pr.deletions),
            pr.comments
        );
        if !pr.subdirectories.is_empty() {
            println!("      {}", subdirectory_list(pr));
        }
    }
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!("# {} pull requests since {}\n\n", report.repo, report.since));
    md.push_str(&format!(
        "**Open:** {} | **Closed:** {} ({} merged) | **Changes:** {}\n\n",
        format_count(report.open.len() as u64),
        format_count(report.closed.len() as u64),
        format_count(report.merged_count() as u64),
        format_count(report.total_changes)
    ));

    for (heading, prs) in [("Open", &report.open), ("Closed", &report.closed)] {
        md.push_str(&format!("## {}\n\n", heading));
        if prs.is_empty() {
            md.push_str("None.\n\n");
            continue;
        }
        md.push_str("| Size | PR | Author | Changes | Comments | Subdirectories |\n");
        md.push_str("|---|---|---|---|---|---|\n");
        for pr in prs {
            let link = if pr.html_url.is_empty() {
                format!("#{} {}", pr.number, pr.title)
            } else {
                format!("[#{}]({}) {}", pr.number, pr.html_url, pr.title)
            };
            md.push_str(&format!(
                "| {} | {} | {} | +{} -{} | {} | {} |\n",
                pr.class.dots(),
                link,
                pr.author,
                format_count(pr.additions),
                format_count(pr.deletions),
                pr.comments,
                subdirectory_list(pr)
            ));
        }
        md.push('\n');
    }

    std::fs::write(path, md)?;
    Ok(())
}

fn colorize_class(class: SizeClass) -> colored::ColoredString {
    let dots = format!("{:<5}", class.dots());
    match class {
        SizeClass::Tiny | SizeClass::Small => dots.green(),
        SizeClass::Medium => dots.yellow(),
        SizeClass::Large => dots.red(),
        SizeClass::Huge => dots.red().bold(),
    }
}
