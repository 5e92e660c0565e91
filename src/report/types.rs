use crate::pr::stats::SizeClass;

/// One pull request as shown in the report.
#[derive(Debug, Clone)]
pub struct PrSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub html_url: String,
    pub class: SizeClass,
    pub total_changes: u64,
    pub additions: u64,
    pub deletions: u64,
    /// Issue comments plus review comments
    pub comments: u64,
    /// Top subdirectories with their change counts
    pub subdirectories: Vec<(String, u64)>,
    pub created_at: String,
    /// Human-readable close time; `None` for open pull requests
    pub closed_at: Option<String>,
    /// Human-readable merge time; `None` unless merged
    pub merged_at: Option<String>,
}

/// Complete report for one repository and cutoff.
#[derive(Debug)]
pub struct Report {
    /// Repository as `owner/repo`
    pub repo: String,
    /// Cutoff, RFC 3339
    pub since: String,
    pub open: Vec<PrSummary>,
    pub closed: Vec<PrSummary>,
    /// Changes across every pull request in the report
    pub total_changes: u64,
}

impl Report {
    pub fn merged_count(&self) -> usize {
        self.closed.iter().filter(|pr| pr.merged_at.is_some()).count()
    }
}
