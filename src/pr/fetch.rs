use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::ignore::IgnoreSet;
use super::types::{File, PrState, PullRequest, RepoId};
use super::QueryError;
use crate::github::{self, Transport};

/// Pull requests with activity after the cutoff, newest first.
#[derive(Debug, Default)]
pub struct PullRequests {
    pub open: Vec<PullRequest>,
    pub closed: Vec<PullRequest>,
}

/// Receives counts as fetching proceeds.
pub trait Progress {
    fn page_fetched(&self, open: usize, closed: usize, total: usize);
    fn detail_fetched(&self, done: usize, of: usize);
}

/// Reports progress as `tracing` events.
pub struct LogProgress;

impl Progress for LogProgress {
    fn page_fetched(&self, open: usize, closed: usize, total: usize) {
        info!(open, closed, total, "fetched pull request page");
    }

    fn detail_fetched(&self, done: usize, of: usize) {
        debug!(done, of, "fetched pull request details");
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, QueryError> {
    serde_json::from_str(body).map_err(|source| QueryError::Decode {
        url: url.to_string(),
        source,
    })
}

fn parse_time(field: &'static str, value: Option<&str>) -> Result<DateTime<Utc>, QueryError> {
    let value = value.unwrap_or_default();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| QueryError::Format {
            field,
            value: value.to_string(),
            source,
        })
}

/// Walk the pull request listing of `repo` and keep everything opened or
/// closed after `since`.
///
/// The listing is sorted by last update, descending, so the walk stops at the
/// first closed pull request that closed at or before `since`. Open pull
/// requests never end the walk.
#[instrument(skip_all, fields(repo = %repo, since = %since.to_rfc3339()))]
pub async fn fetch_pull_requests(
    transport: &dyn Transport,
    api_base: &str,
    repo: &RepoId,
    since: DateTime<Utc>,
    progress: &dyn Progress,
) -> Result<PullRequests, QueryError> {
    info!("querying pull requests opened or closed after cutoff");
    let mut result = PullRequests::default();
    let mut next = Some(github::pulls_url(api_base, &repo.owner, &repo.repo));
    let mut total = 0usize;

    'pages: while let Some(url) = next.take() {
        let page = transport.get(&url).await?;
        let fetched: Vec<PullRequest> = decode(&url, &page.body)?;
        total += fetched.len();
        next = page.next;

        for pr in fetched {
            match pr.state {
                PrState::Open => {
                    if parse_time("created_at", Some(pr.created_at.as_str()))? > since {
                        result.open.push(pr);
                    }
                }
                PrState::Closed => {
                    if parse_time("closed_at", pr.closed_at.as_deref())? <= since {
                        debug!(number = pr.number, "reached pull request closed before cutoff");
                        progress.page_fetched(result.open.len(), result.closed.len(), total);
                        break 'pages;
                    }
                    result.closed.push(pr);
                }
                PrState::Other => continue,
            }
        }
        progress.page_fetched(result.open.len(), result.closed.len(), total);
    }

    info!(
        open = result.open.len(),
        closed = result.closed.len(),
        total,
        "pull request listing complete"
    );
    Ok(result)
}

/// Every file changed by the pull request at `url`, across all pages.
async fn fetch_files(transport: &dyn Transport, url: &str) -> Result<Vec<File>, QueryError> {
    let mut files = Vec::new();
    let mut next = Some(format!("{}/files", url));
    while let Some(page_url) = next.take() {
        let page = transport.get(&page_url).await?;
        let mut fetched: Vec<File> = decode(&page_url, &page.body)?;
        files.append(&mut fetched);
        next = page.next;
    }
    Ok(files)
}

/// Replace each pull request with its detailed record and attach its changed
/// files, minus those matched by `ignore`.
///
/// Records are processed front to back; the first failure aborts the pass.
#[instrument(skip_all, fields(count = prs.len()))]
pub async fn enrich_pull_requests(
    transport: &dyn Transport,
    prs: Vec<PullRequest>,
    ignore: &IgnoreSet,
    progress: &dyn Progress,
) -> Result<Vec<PullRequest>, QueryError> {
    info!("querying detailed info for each pull request");
    let count = prs.len();
    let mut enriched = Vec::with_capacity(count);

    for (i, summary) in prs.into_iter().enumerate() {
        let page = transport.get(&summary.url).await?;
        let mut detailed: PullRequest = decode(&summary.url, &page.body)?;
        if detailed.url.is_empty() {
            detailed.url = summary.url;
        }

        let files = fetch_files(transport, &detailed.url).await?;
        let fetched = files.len();
        detailed.files = ignore.retain(files);
        debug!(
            number = detailed.number,
            files = detailed.files.len(),
            ignored = fetched - detailed.files.len(),
            "enriched pull request"
        );

        enriched.push(detailed);
        progress.detail_fetched(i + 1, count);
    }

    Ok(enriched)
}
