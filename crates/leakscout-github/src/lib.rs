//! GitHub-facing half of leakscout: the resilient, rate-limit-aware API
//! client and the bounded-concurrency fetch/scan orchestrator.

pub mod client;
pub mod error;
pub mod net;
pub mod rate;
pub mod scanner;

pub use client::{GithubClient, RemoteFile};
pub use error::GithubError;
pub use rate::RateStatus;
pub use scanner::{RepoScanner, ScanOutcome};
