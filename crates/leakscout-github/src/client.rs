//! Async GitHub API client. Every request goes through one retrying
//! driver loop acting on the pure classification in `net::retry`; the
//! rate snapshot is refreshed from every response, errors included.

use crate::error::GithubError;
use crate::net::retry::{
    backoff_delay, classify_response, parse_retry_after, Exhausted, RetryPolicy, RetryStep,
    Terminal,
};
use crate::net::sleeper::{Sleeper, TokioSleeper};
use crate::rate::{RateStatus, RateTracker};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("leakscout/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_EXCERPT: usize = 200;

/// One blob entry from the recursive tree listing.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub path: String,
    /// API URL of the blob object.
    pub blob_url: String,
    pub sha: String,
    /// Not always reported by the listing; `None` means unknown.
    pub size: Option<u64>,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    tree: TreeRef,
}

#[derive(Deserialize)]
struct TreeRef {
    sha: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: Option<String>,
    url: Option<String>,
    sha: Option<String>,
    size: Option<u64>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct BlobResponse {
    content: Option<String>,
    encoding: Option<String>,
}

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    rate: RateTracker,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GithubClient {
    pub fn new(token: Option<&str>) -> Result<Self, GithubError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: Option<&str>, base_url: &str) -> Result<Self, GithubError> {
        Self::with_parts(
            token,
            base_url,
            RetryPolicy::default(),
            Arc::new(TokioSleeper),
        )
    }

    /// Full-control constructor, used by tests to inject a recording
    /// sleeper and a tightened retry policy.
    pub fn with_parts(
        token: Option<&str>,
        base_url: &str,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GithubError::Forbidden("invalid authorization token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate: RateTracker::new(),
            policy,
            sleeper,
        })
    }

    pub fn rate_status(&self) -> RateStatus {
        self.rate.snapshot()
    }

    /// Fetches the default branch name of a repository.
    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, GithubError> {
        let info: RepoInfo = self.get_json(&format!("/repos/{owner}/{repo}")).await?;
        info.default_branch.ok_or_else(|| {
            GithubError::MalformedResponse(format!(
                "could not determine default branch for {owner}/{repo}"
            ))
        })
    }

    /// Resolves a branch to the SHA of its root tree.
    pub async fn tree_sha_for_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, GithubError> {
        let info: BranchInfo = self
            .get_json(&format!("/repos/{owner}/{repo}/branches/{branch}"))
            .await?;
        Ok(info.commit.commit.tree.sha)
    }

    /// Lists every blob in a tree, recursively. A truncated listing is
    /// reported upstream as a flag, not an error; we log and carry on
    /// with whatever came back.
    pub async fn list_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
    ) -> Result<Vec<RemoteFile>, GithubError> {
        let response: TreeResponse = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/git/trees/{tree_sha}?recursive=1"
            ))
            .await?;

        if response.truncated {
            tracing::warn!(owner, repo, "tree listing truncated, not every file will be scanned");
        }

        Ok(response
            .tree
            .into_iter()
            .filter(|entry| entry.kind.as_deref() == Some("blob"))
            .filter_map(|entry| {
                Some(RemoteFile {
                    path: entry.path?,
                    blob_url: entry.url?,
                    sha: entry.sha?,
                    size: entry.size,
                })
            })
            .collect())
    }

    /// The three sequential listing calls: repository metadata for the
    /// default branch, branch detail for the tree SHA, then the recursive
    /// listing. A missing repository surfaces as a repository-level
    /// not-found.
    pub async fn repo_tree(&self, owner: &str, repo: &str) -> Result<Vec<RemoteFile>, GithubError> {
        let branch = self.default_branch(owner, repo).await.map_err(|err| match err {
            GithubError::NotFound(_) => GithubError::NotFound(format!("repository {owner}/{repo}")),
            other => other,
        })?;
        let tree_sha = self.tree_sha_for_branch(owner, repo, &branch).await?;
        self.list_tree(owner, repo, &tree_sha).await
    }

    /// Fetches and decodes a blob's text content. Non-text, undecodable
    /// or malformed blob payloads yield an empty string rather than an
    /// error; actual API failures still propagate.
    pub async fn fetch_blob_text(&self, blob_url: &str) -> Result<String, GithubError> {
        let blob: BlobResponse = match self.get_json(blob_url).await {
            Ok(blob) => blob,
            Err(GithubError::MalformedResponse(err)) => {
                tracing::warn!(blob_url, "unreadable blob payload: {err}");
                return Ok(String::new());
            }
            Err(err) => return Err(err),
        };

        if blob.encoding.as_deref() != Some("base64") {
            return Ok(String::new());
        }
        let content = match blob.content {
            Some(content) if !content.is_empty() => content,
            _ => return Ok(String::new()),
        };

        // The API wraps base64 payloads with newlines; strip whitespace
        // before decoding.
        let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match BASE64.decode(compact.as_bytes()) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                tracing::warn!(blob_url, "binary or non-base64 blob content, skipping: {err}");
                Ok(String::new())
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let response = self.request(url).await?;
        response
            .json()
            .await
            .map_err(|err| GithubError::MalformedResponse(err.to_string()))
    }

    /// The retrying driver. One logical call gets `policy.max_attempts`
    /// attempts; backoff sleeps track their own exponent so an honored
    /// Retry-After never advances the schedule.
    async fn request(&self, url: &str) -> Result<reqwest::Response, GithubError> {
        let full_url = if url.starts_with("https://") || url.starts_with("http://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        };

        let mut backoff_step: u32 = 0;

        for attempt in 0..self.policy.max_attempts {
            let last = attempt + 1 == self.policy.max_attempts;

            let response = match self.http.get(&full_url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if last {
                        tracing::error!(url = %full_url, "request error (final): {err}");
                        return Err(GithubError::Transport(err));
                    }
                    let delay = backoff_delay(&self.policy, backoff_step);
                    backoff_step += 1;
                    tracing::debug!(
                        url = %full_url,
                        attempt,
                        "request error, retrying after {:?}: {err}",
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                    continue;
                }
            };

            self.record_rate(response.headers());

            let status = response.status().as_u16();
            let retry_after = parse_retry_after(response.headers());

            match classify_response(status, retry_after, self.rate.snapshot().remaining) {
                RetryStep::Success => return Ok(response),
                RetryStep::RetryAfter(delay) => {
                    tracing::warn!(
                        url = %full_url,
                        status,
                        "honoring Retry-After of {}s",
                        delay.as_secs()
                    );
                    self.sleeper.sleep(delay).await;
                }
                RetryStep::Backoff(exhausted) => {
                    if last {
                        return Err(match exhausted {
                            Exhausted::Forbidden => GithubError::Forbidden(full_url),
                            Exhausted::Upstream => upstream_error(response).await,
                        });
                    }
                    let delay = backoff_delay(&self.policy, backoff_step);
                    backoff_step += 1;
                    tracing::debug!(
                        url = %full_url,
                        status,
                        attempt,
                        "retrying after {:?}",
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                }
                RetryStep::Terminal(terminal) => {
                    return Err(match terminal {
                        Terminal::NotFound => GithubError::NotFound(full_url),
                        Terminal::RateLimited => GithubError::RateLimitExceeded,
                        Terminal::Upstream => upstream_error(response).await,
                    });
                }
            }
        }

        Err(GithubError::MaxRetries)
    }

    fn record_rate(&self, headers: &HeaderMap) {
        let remaining = header_i64(headers, "x-ratelimit-remaining");
        let reset_at = header_i64(headers, "x-ratelimit-reset");
        if let (Some(remaining), Some(reset_at)) = (remaining, reset_at) {
            self.rate.replace(RateStatus { remaining, reset_at });
        }
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

async fn upstream_error(response: reqwest::Response) -> GithubError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GithubError::Upstream {
        status,
        body: body.chars().take(ERROR_BODY_EXCERPT).collect(),
    }
}
