use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal certainty of a finding. The derived `Ord` (Low < Medium < High)
/// is the single source of truth for deduplication tie-breaking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Which half of the detection engine produced a finding. Serialized with
/// the wire names the scan response has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    #[serde(rename = "regex")]
    Pattern,
    #[serde(rename = "entropy")]
    Entropy,
}

/// A single potential secret. The snippet is already redacted; the raw
/// matched value is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub file_path: String,
    /// 1-indexed line number within the file.
    pub line: u32,
    pub snippet: String,
    #[serde(rename = "ruleId")]
    pub rule_kind: RuleKind,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub files_scanned: u64,
    pub files_skipped: u64,
    pub duration_ms: u64,
}
