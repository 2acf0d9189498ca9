//! # pagecrypt Fetch
//!
//! Retrieval of recipient public keysets.
//!
//! - [`KeyFetcher`] - Async seam the pipeline depends on
//! - [`HttpKeyFetcher`] - GET with a bounded timeout and body cap
//! - [`StaticKeyFetcher`] - In-memory keyset, for tests and offline use
//!
//! Every failure is fatal to the caller: there are no retries and no
//! fallback keys.

pub mod config;
pub mod error;
pub mod fetcher;

pub use config::FetchConfig;
pub use error::{FetchError, Result};
pub use fetcher::{HttpKeyFetcher, KeyFetcher, StaticKeyFetcher};
