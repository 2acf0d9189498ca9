//! Sealer configuration.

use pagecrypt_core::SectionRules;
use pagecrypt_fetch::FetchConfig;
use serde::{Deserialize, Serialize};

/// Recipient id the wrapped key is filed under in the `cryptokeys` map.
pub const DEFAULT_RECIPIENT_ID: &str = "google.com";

/// Configuration for a [`Sealer`](crate::Sealer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealConfig {
    /// How protected sections and document regions are recognized.
    pub sections: SectionRules,
    /// Key of the wrapped-key entry in the `cryptokeys` JSON map.
    pub recipient_id: String,
    /// Inputs longer than this are refused before parsing.
    pub max_document_bytes: usize,
    /// Settings for the HTTP key fetcher.
    pub fetch: FetchConfig,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            sections: SectionRules::default(),
            recipient_id: DEFAULT_RECIPIENT_ID.to_string(),
            max_document_bytes: 16 * 1024 * 1024,
            fetch: FetchConfig::default(),
        }
    }
}
