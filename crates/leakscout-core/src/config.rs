//! Scan configuration. Values are fixed for the duration of a scan; the
//! numeric limits can be overridden through the environment at startup.

/// File extensions that are never worth fetching: binary and media formats,
/// archives, fonts, and bundled or minified assets.
const FILE_EXT_DENYLIST: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".svg", ".ico", ".webp", ".mp3", ".wav", ".flac",
    ".ogg", ".mp4", ".mov", ".avi", ".wmv", ".mkv", ".zip", ".gz", ".tar", ".rar", ".7z", ".pdf",
    ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".eot", ".ttf", ".woff", ".woff2", ".bin",
    ".exe", ".iso", ".img", ".dmg", ".log", ".min.js", ".bundle.js", ".map",
];

/// Path fragments that mark lockfiles and vendor or build output.
const FILE_PATH_DENYLIST: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.lock",
    "gemfile.lock",
    "go.sum",
    "vendor/",
    "node_modules/",
    "/dist/",
    "/build/",
    "/.next/",
    "/.vercel/",
    "/.venv/",
];

/// Credential-related keywords that escalate a low-signal match.
const KEYWORD_PATTERNS: &[&str] = &[
    "key",
    "token",
    "secret",
    "password",
    "passwd",
    "bearer",
    "auth",
    "api_key",
    "client_secret",
    "private_key",
    "aws_access_key_id",
    "aws_secret_access_key",
    "stripe_key",
    "github_token",
    "slack_token",
];

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Files larger than this many bytes are skipped outright.
    pub max_file_size: u64,
    /// Upper bound on simultaneous in-flight blob fetches.
    pub max_concurrent_fetches: usize,
    /// Cap on files scanned in one request; overflow counts as skipped.
    pub max_files_per_scan: usize,
    pub ext_denylist: Vec<String>,
    pub path_denylist: Vec<String>,
    pub keywords: Vec<String>,
    /// Shannon entropy (bits per char) above which a generic token counts
    /// as a candidate secret.
    pub entropy_threshold: f64,
    pub snippet_max_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: 750_000,
            max_concurrent_fetches: 10,
            max_files_per_scan: 2000,
            ext_denylist: FILE_EXT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            path_denylist: FILE_PATH_DENYLIST.iter().map(|s| s.to_string()).collect(),
            keywords: KEYWORD_PATTERNS.iter().map(|s| s.to_string()).collect(),
            entropy_threshold: 4.5,
            snippet_max_len: 200,
        }
    }
}

impl ScanConfig {
    /// Defaults with the numeric limits overridable via
    /// `LEAKSCOUT_MAX_FILE_SIZE`, `LEAKSCOUT_MAX_CONCURRENT_FETCHES` and
    /// `LEAKSCOUT_MAX_FILES_PER_SCAN`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_u64("LEAKSCOUT_MAX_FILE_SIZE") {
            config.max_file_size = v;
        }
        if let Some(v) = env_u64("LEAKSCOUT_MAX_CONCURRENT_FETCHES") {
            config.max_concurrent_fetches = v as usize;
        }
        if let Some(v) = env_u64("LEAKSCOUT_MAX_FILES_PER_SCAN") {
            config.max_files_per_scan = v as usize;
        }
        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.parse().ok()
}
