use thiserror::Error;

/// Everything that can go wrong talking to GitHub. Any of these aborts a
/// scan; failures that only affect a single file are handled inside the
/// client (undecodable blobs become empty content, not errors).
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimitExceeded,

    #[error("forbidden, check credentials and permissions: {0}")]
    Forbidden(String),

    #[error("GitHub error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected GitHub response: {0}")]
    MalformedResponse(String),

    #[error("max retries exceeded for request")]
    MaxRetries,
}
