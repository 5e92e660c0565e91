use async_trait::async_trait;
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use thiserror::Error;
use tracing::{debug, instrument};

/// Default GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Status { url: String, status: u16 },
}

/// One response body plus the URL of the page after it, if any.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub body: String,
    pub next: Option<String>,
}

/// Fetches a single page of an API resource.
///
/// Implementations must not retry or reorder requests; the callers rely on
/// each `get` completing before the next one is issued.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Page, TransportError>;
}

/// `Transport` backed by the GitHub REST API over HTTPS.
pub struct HttpTransport {
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Page, TransportError> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, "pr-stats")
            .header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_link);
        let body = response.text().await?;
        debug!(bytes = body.len(), has_next = next.is_some(), "received page");

        Ok(Page { body, next })
    }
}

/// Extract the `rel="next"` target from a `Link` response header.
///
/// Expected format: `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let param = param.trim();
            match param.split_once('=') {
                Some((key, value)) => {
                    key.trim() == "rel"
                        && value
                            .trim()
                            .trim_matches('"')
                            .split_whitespace()
                            .any(|rel| rel == "next")
                }
                None => false,
            }
        });
        is_next.then(|| url.to_string())
    })
}

/// Listing of every pull request in `owner/repo`, most recently updated first.
pub fn pulls_url(api_base: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/{}/pulls?state=all&sort=updated&direction=desc",
        api_base.trim_end_matches('/'),
        owner,
        repo
    )
}
