//! Key fetcher abstraction.
//!
//! The sealing pipeline only needs "give me the recipient's public keyset
//! for this URL". [`HttpKeyFetcher`] does that over HTTP(S);
//! [`StaticKeyFetcher`] serves a keyset held in memory.

use async_trait::async_trait;
use pagecrypt_keys::RecipientPublicKeyBundle;
use reqwest::Client;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};

/// Source of recipient public keysets.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Retrieve and validate the public keyset published at `url`.
    async fn fetch(&self, url: &str) -> Result<RecipientPublicKeyBundle>;
}

/// Fetches Tink JSON keysets with a single GET per call. No retries.
#[derive(Debug, Clone)]
pub struct HttpKeyFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpKeyFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Read the body, refusing to buffer more than the configured cap.
    async fn read_capped(&self, url: &str, mut response: reqwest::Response) -> Result<Vec<u8>> {
        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(url, e))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self, url: &str) -> Result<RecipientPublicKeyBundle> {
        debug!(url, "fetching recipient keyset");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = self.read_capped(url, response).await?;
        let bundle = RecipientPublicKeyBundle::from_json(&body)?;

        debug!(
            url,
            primary_key_id = bundle.primary_key_id(),
            bytes = body.len(),
            "recipient keyset fetched"
        );
        Ok(bundle)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Serves one keyset for every URL.
#[derive(Debug, Clone)]
pub struct StaticKeyFetcher {
    bundle: RecipientPublicKeyBundle,
}

impl StaticKeyFetcher {
    pub fn new(bundle: RecipientPublicKeyBundle) -> Self {
        Self { bundle }
    }

    /// Parse a Tink JSON keyset up front.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(Self::new(RecipientPublicKeyBundle::from_json(json)?))
    }
}

#[async_trait]
impl KeyFetcher for StaticKeyFetcher {
    async fn fetch(&self, _url: &str) -> Result<RecipientPublicKeyBundle> {
        Ok(self.bundle.clone())
    }
}
