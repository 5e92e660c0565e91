use serde::Deserialize;

/// A pull request as returned by the GitHub pulls API.
///
/// Listing pages carry a subset of these fields; the rest stay at their
/// defaults until the record is replaced by its detailed form during
/// enrichment. Timestamps are kept as the raw RFC 3339 strings from the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)] // Mirrors the API payload; not every field feeds the report
pub struct PullRequest {
    /// API URL of this pull request; `{url}/files` lists its changed files
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    pub number: u64,
    pub state: PrState,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub review_comments: u64,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    /// Changed files, minus ignored paths. Empty until enriched.
    #[serde(skip)]
    pub files: Vec<File>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
}

/// A single file touched by a pull request.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct File {
    #[serde(default)]
    pub sha: Option<String>,
    /// Path relative to the repository root (e.g., "pkg/sql/parser.go")
    pub filename: String,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    /// additions + deletions, as reported upstream
    #[serde(default)]
    pub changes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    #[default]
    Modified,
    Removed,
    Renamed,
    #[serde(other)]
    Other,
}

/// Repository coordinates, e.g. `cockroachdb/cockroach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
