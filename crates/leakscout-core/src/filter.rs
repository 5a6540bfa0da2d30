//! Pure predicate deciding whether a discovered file is worth fetching.

use crate::config::ScanConfig;

/// Returns true when a file should be fetched and scanned.
///
/// A missing size never causes rejection; the tree listing does not always
/// report one and "unknown" must not be treated as "too large".
pub fn is_scannable(path: &str, size: Option<u64>, config: &ScanConfig) -> bool {
    if let Some(size) = size {
        if size > config.max_file_size {
            return false;
        }
    }

    let lower = path.to_lowercase();

    if config.ext_denylist.iter().any(|ext| lower.ends_with(ext)) {
        return false;
    }

    if config.path_denylist.iter().any(|frag| lower.contains(frag)) {
        return false;
    }

    true
}
