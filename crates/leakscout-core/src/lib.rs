pub mod config;
pub mod engine;
pub mod entropy;
pub mod filter;
pub mod model;
pub mod rules;
pub mod snippet;

pub use config::ScanConfig;
pub use engine::find_secrets;
pub use entropy::shannon_entropy;
pub use filter::is_scannable;
pub use model::{Confidence, Finding, RuleKind, ScanStats};
pub use rules::{signature_rules, SignatureRule};
