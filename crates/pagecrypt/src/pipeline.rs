//! The sealing pipeline.
//!
//! parse → locate → generate key → encrypt sections → fetch recipient key →
//! wrap → embed → render. Strictly sequential and all-or-nothing: any stage
//! failing drops the document and returns the error.

use pagecrypt_core::{locate_sections, Document};
use pagecrypt_fetch::{HttpKeyFetcher, KeyFetcher};
use pagecrypt_keys::SymmetricKeyBundle;
use tracing::{debug, info};

use crate::assembler::embed_key;
use crate::config::SealConfig;
use crate::encryptor::encrypt_sections;
use crate::error::{Result, SealError};
use crate::wrapper::wrap_key;

/// Output of a successful seal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedDocument {
    /// The rewritten document.
    pub html: String,
    /// Number of protected sections replaced by ciphertext carriers.
    pub sealed_sections: usize,
}

/// Seals documents for recipients whose keysets come from `F`.
///
/// Holds no per-document state; one instance can seal any number of
/// documents concurrently.
pub struct Sealer<F: KeyFetcher> {
    fetcher: F,
    config: SealConfig,
}

impl Sealer<HttpKeyFetcher> {
    /// A sealer fetching recipient keysets over HTTP.
    pub fn with_http(config: SealConfig) -> Result<Self> {
        let fetcher = HttpKeyFetcher::new(&config.fetch)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: KeyFetcher> Sealer<F> {
    pub fn new(fetcher: F, config: SealConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &SealConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Seal `html` for the recipient whose keyset is published at
    /// `public_key_url`, granting `access_requirement`.
    #[tracing::instrument(skip_all, fields(url = %public_key_url))]
    pub async fn seal(
        &self,
        html: &str,
        public_key_url: &str,
        access_requirement: &str,
    ) -> Result<SealedDocument> {
        let mut doc = Document::parse_with_limit(html, self.config.max_document_bytes)?;
        debug!(nodes = doc.len(), "parsed document");

        let sections = locate_sections(&doc, &self.config.sections);

        let bundle = SymmetricKeyBundle::generate().map_err(SealError::KeyGeneration)?;
        let cipher = bundle.cipher().map_err(SealError::KeyGeneration)?;
        let sealed_sections = encrypt_sections(&mut doc, &sections, &cipher)?;

        let recipient = self.fetcher.fetch(public_key_url).await?;
        let wrapped = wrap_key(&bundle, access_requirement, &recipient)?;
        embed_key(&mut doc, &wrapped, &self.config.recipient_id, &self.config.sections)?;

        let html = doc.to_html();
        info!(
            sealed_sections,
            recipient_key_id = recipient.primary_key_id(),
            output_bytes = html.len(),
            "document sealed"
        );

        Ok(SealedDocument {
            html,
            sealed_sections,
        })
    }
}

/// Seal `html` with default settings, fetching the recipient keyset from
/// `public_key_url` over HTTP.
pub async fn generate_encrypted_document(
    html: &str,
    public_key_url: &str,
    access_requirement: &str,
) -> Result<String> {
    let sealer = Sealer::with_http(SealConfig::default())?;
    let sealed = sealer.seal(html, public_key_url, access_requirement).await?;
    Ok(sealed.html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecrypt_fetch::StaticKeyFetcher;
    use pagecrypt_testkit::{fixtures, open_document, TestRecipient, ACCESS_REQUIREMENT};

    fn sealer(recipient: &TestRecipient) -> Sealer<StaticKeyFetcher> {
        Sealer::new(
            StaticKeyFetcher::new(recipient.bundle()),
            SealConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_seal_single_section() {
        let recipient = TestRecipient::ecies();
        let sealed = sealer(&recipient)
            .seal(&fixtures::single_section(), "https://keys.example/k", ACCESS_REQUIREMENT)
            .await
            .unwrap();

        assert_eq!(sealed.sealed_sections, 1);
        assert!(!sealed.html.contains("Subscriber-only"));
        assert!(sealed.html.contains("<p>Lead paragraph.</p>"));

        let opened = open_document(&sealed.html, &recipient, "google.com").unwrap();
        assert_eq!(opened.sections, vec!["<p>Subscriber-only paragraph.</p>".to_string()]);
    }

    #[tokio::test]
    async fn test_document_too_large() {
        let recipient = TestRecipient::ecies();
        let config = SealConfig {
            max_document_bytes: 16,
            ..SealConfig::default()
        };
        let sealer = Sealer::new(StaticKeyFetcher::new(recipient.bundle()), config);

        let err = sealer
            .seal(&fixtures::single_section(), "https://keys.example/k", ACCESS_REQUIREMENT)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "parse");
    }

    #[tokio::test]
    async fn test_plain_document_is_structural_error() {
        let recipient = TestRecipient::ecies();
        let err = sealer(&recipient)
            .seal(&fixtures::plain_document(), "https://keys.example/k", ACCESS_REQUIREMENT)
            .await
            .unwrap_err();

        assert!(matches!(err, SealError::Structural(_)));
    }

    #[test]
    fn test_sealer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sealer<StaticKeyFetcher>>();
        assert_send_sync::<Sealer<HttpKeyFetcher>>();
    }
}
