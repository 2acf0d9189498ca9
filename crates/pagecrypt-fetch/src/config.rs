//! Fetcher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`HttpKeyFetcher`](crate::HttpKeyFetcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound on the whole request, connect through body.
    pub timeout: Duration,

    /// Largest keyset body accepted, in bytes.
    pub max_body_bytes: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024,
            user_agent: concat!("pagecrypt/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
