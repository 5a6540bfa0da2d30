//! The retry state machine as pure functions: a response is classified
//! into a tagged step and the driver loop in the client acts on it. No
//! network I/O happens here, which keeps the policy testable on its own.

use reqwest::header::HeaderMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// What exhausting the backoff retries escalates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    /// 403/429 with quota left: a forbidden error once retries run out.
    Forbidden,
    /// 5xx: the generic upstream error carrying status and body.
    Upstream,
}

/// Non-retryable outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    NotFound,
    RateLimited,
    Upstream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// 2xx, hand the response to the caller.
    Success,
    /// The server named a resume time. Sleep it and continue; neither the
    /// backoff schedule nor the per-call failure mode advances.
    RetryAfter(Duration),
    /// Transient failure: back off and consume an attempt.
    Backoff(Exhausted),
    Terminal(Terminal),
}

pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?;
    let secs: u64 = value.parse().ok()?;
    Some(Duration::from_secs(secs))
}

/// Classifies a response status. `rate_remaining` is the latest known
/// quota, already updated from this response's headers.
pub fn classify_response(
    status: u16,
    retry_after: Option<Duration>,
    rate_remaining: i64,
) -> RetryStep {
    if (200..300).contains(&status) {
        return RetryStep::Success;
    }

    match status {
        403 | 429 => {
            if let Some(delay) = retry_after {
                return RetryStep::RetryAfter(delay);
            }
            if rate_remaining == 0 {
                return RetryStep::Terminal(Terminal::RateLimited);
            }
            RetryStep::Backoff(Exhausted::Forbidden)
        }
        404 => RetryStep::Terminal(Terminal::NotFound),
        500..=599 => RetryStep::Backoff(Exhausted::Upstream),
        _ => RetryStep::Terminal(Terminal::Upstream),
    }
}

/// Exponential backoff: `base * 2^step`, so 0.5s, 1s, 2s with defaults.
pub fn backoff_delay(policy: &RetryPolicy, step: u32) -> Duration {
    policy.base_delay.saturating_mul(1u32 << step.min(16))
}
