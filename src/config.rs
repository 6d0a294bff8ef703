//! Client configuration, read from the environment (and `.env`, loaded in `main`).

use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
// Batches of large log files take a while to parse server-side.
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the event search API, without a trailing slash.
    pub api_url: String,

    /// Timeout for search, stats and file listing requests.
    pub timeout: Duration,

    /// Timeout for the multipart upload request.
    pub upload_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from `LOGSEARCH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            api_url: lookup("LOGSEARCH_API_URL")
                .filter(|url| !url.trim().is_empty())
                .map(|url| normalize_url(&url))
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(secs("LOGSEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            upload_timeout: Duration::from_secs(secs(
                "LOGSEARCH_UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )),
        }
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_url(url);
        self
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
