//! The fetch/scan orchestrator: lists the tree, filters and caps it, then
//! fans out bounded fetch-and-scan units and aggregates their findings.

use crate::client::{GithubClient, RemoteFile};
use crate::error::GithubError;
use crate::net::gate::FetchGate;
use crate::rate::RateStatus;
use leakscout_core::{find_secrets, is_scannable, Finding, ScanConfig, ScanStats};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// The complete result of one scan. Findings arrive in unit completion
/// order; no cross-file ordering is promised.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub stats: ScanStats,
    pub findings: Vec<Finding>,
    #[serde(rename = "rateLimit")]
    pub rate: RateStatus,
}

pub struct RepoScanner {
    client: Arc<GithubClient>,
    config: Arc<ScanConfig>,
}

impl RepoScanner {
    pub fn new(client: GithubClient, config: ScanConfig) -> Self {
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
        }
    }

    /// Scans every scannable file of the repository's default branch.
    ///
    /// Client errors abort the whole scan; a partial result is never
    /// returned. Failures confined to one file contribute zero findings.
    pub async fn scan(&self, owner: &str, repo: &str) -> Result<ScanOutcome, GithubError> {
        let started = Instant::now();
        tracing::info!(owner, repo, "starting scan");

        let all_files = self.client.repo_tree(owner, repo).await?;

        let mut files_skipped = 0u64;
        let mut scannable: Vec<RemoteFile> = Vec::new();
        for file in all_files {
            if is_scannable(&file.path, file.size, &self.config) {
                scannable.push(file);
            } else {
                files_skipped += 1;
            }
        }

        if scannable.len() > self.config.max_files_per_scan {
            tracing::warn!(
                scannable = scannable.len(),
                cap = self.config.max_files_per_scan,
                "too many scannable files, capping scan"
            );
            files_skipped += (scannable.len() - self.config.max_files_per_scan) as u64;
            scannable.truncate(self.config.max_files_per_scan);
        }

        let files_scanned = scannable.len() as u64;

        if scannable.is_empty() {
            tracing::info!(owner, repo, "no scannable files found");
            return Ok(self.outcome(files_scanned, files_skipped, Vec::new(), started));
        }

        tracing::info!(
            files_scanned,
            files_skipped,
            "fetching and scanning candidate files"
        );

        let gate = FetchGate::new(self.config.max_concurrent_fetches);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for file in scannable {
            let tx = tx.clone();
            let path = file.path.clone();
            let unit = tokio::spawn(fetch_and_scan(
                Arc::clone(&self.client),
                Arc::clone(&self.config),
                gate.clone(),
                file,
            ));
            tokio::spawn(async move {
                let result = match unit.await {
                    Ok(result) => result,
                    Err(err) => {
                        // A panicked unit is a per-file failure, not a scan
                        // failure.
                        tracing::error!(path = %path, "scan unit failed unexpectedly: {err}");
                        Ok(Vec::new())
                    }
                };
                // The receiver disappears once the scan has aborted;
                // nothing to do with the result then.
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut findings = Vec::new();
        while let Some(result) = rx.recv().await {
            findings.extend(result?);
        }

        Ok(self.outcome(files_scanned, files_skipped, findings, started))
    }

    fn outcome(
        &self,
        files_scanned: u64,
        files_skipped: u64,
        findings: Vec<Finding>,
        started: Instant,
    ) -> ScanOutcome {
        let stats = ScanStats {
            files_scanned,
            files_skipped,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            files_scanned,
            files_skipped,
            findings = findings.len(),
            duration_ms = stats.duration_ms,
            "scan complete"
        );
        ScanOutcome {
            stats,
            findings,
            rate: self.client.rate_status(),
        }
    }
}

/// One unit of work: take a slot at the gate, fetch the blob, scan it.
/// Empty content (binary, undecodable, genuinely empty) contributes no
/// findings.
async fn fetch_and_scan(
    client: Arc<GithubClient>,
    config: Arc<ScanConfig>,
    gate: FetchGate,
    file: RemoteFile,
) -> Result<Vec<Finding>, GithubError> {
    let _permit = gate.acquire().await;

    tracing::debug!(path = %file.path, "fetching blob");
    let content = client.fetch_blob_text(&file.blob_url).await?;
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let findings = find_secrets(&file.path, &content, &config);
    if !findings.is_empty() {
        tracing::info!(
            path = %file.path,
            count = findings.len(),
            "potential secrets found"
        );
    }
    Ok(findings)
}
