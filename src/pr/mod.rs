pub mod fetch;
pub mod ignore;
pub mod stats;
pub mod types;

pub use fetch::{enrich_pull_requests, fetch_pull_requests, LogProgress, Progress, PullRequests};
pub use ignore::IgnoreSet;
pub use types::{PullRequest, RepoId};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use crate::github::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid {field} timestamp {value:?}: {source}")]
    Format {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid repository: {0} (expected owner/repo)")]
    InvalidRepo(String),
}

/// Parse a repository reference into its owner and name.
///
/// Accepts `owner/repo` or `https://github.com/owner/repo`.
pub fn parse_repo(input: &str) -> Result<RepoId, QueryError> {
    let invalid = || QueryError::InvalidRepo(input.to_string());

    let path = if input.contains("://") {
        let parsed = reqwest::Url::parse(input).map_err(|_| invalid())?;
        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }
        parsed.path().to_string()
    } else {
        input.to_string()
    };

    let segments: Vec<_> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 2 {
        return Err(invalid());
    }

    Ok(RepoId {
        owner: segments[0].to_string(),
        repo: segments[1].trim_end_matches(".git").to_string(),
    })
}

/// Fetch open and closed pull requests with activity after `since`, then
/// enrich both lists with details and filtered file changes.
///
/// Any failure discards everything fetched so far.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn query(
    transport: &dyn Transport,
    api_base: &str,
    repo: &RepoId,
    since: DateTime<Utc>,
    ignore: &IgnoreSet,
    progress: &dyn Progress,
) -> Result<PullRequests, QueryError> {
    let listed = fetch_pull_requests(transport, api_base, repo, since, progress).await?;
    let open = enrich_pull_requests(transport, listed.open, ignore, progress).await?;
    let closed = enrich_pull_requests(transport, listed.closed, ignore, progress).await?;
    info!(open = open.len(), closed = closed.len(), "query complete");
    Ok(PullRequests { open, closed })
}
