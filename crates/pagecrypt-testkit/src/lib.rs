//! # pagecrypt Testkit
//!
//! Testing utilities for pagecrypt.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Recipients**: Hybrid key pairs that publish Tink public keysets and
//!   can unwrap what was sealed for them
//! - **Fixtures**: HTML documents in serializer-stable form
//! - **Extraction**: Helpers that read carriers back out of sealed markup
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Round trip
//!
//! ```rust
//! use pagecrypt_keys::HybridEncrypt;
//! use pagecrypt_testkit::TestRecipient;
//!
//! let recipient = TestRecipient::ecies();
//! let wrap = recipient.bundle().hybrid_encrypt().unwrap();
//!
//! let ciphertext = wrap.encrypt(b"secret", b"").unwrap();
//! assert_eq!(recipient.decrypt(&ciphertext, b"").unwrap(), b"secret");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pagecrypt_testkit::generators::candidate_document;
//!
//! proptest! {
//!     #[test]
//!     fn only_qualifying_sections_are_sealed((html, sections) in candidate_document()) {
//!         // seal `html`, compare carrier count to sections that qualify
//!     }
//! }
//! ```

pub mod extract;
pub mod fixtures;
pub mod generators;
pub mod recipient;

pub use extract::{extract_artifacts, open_document, OpenedDocument, SealedArtifacts};
pub use fixtures::{amp_document, protected_section, ACCESS_REQUIREMENT, KEYSET_PATH};
pub use generators::CandidateSection;
pub use recipient::{TestRecipient, UnwrappedKey, RECIPIENT_KEY_ID};
