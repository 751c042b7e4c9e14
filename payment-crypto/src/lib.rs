//! Session key protection for payment gateway clients
//!
//! Before card data leaves the device, the client encrypts a per-session
//! symmetric key under the gateway's certificate and sends the result as hex.
//! This crate covers that step and the policy around the cached certificate:
//! - Lowercase hex rendering of ciphertext (`hex`)
//! - The immutable gateway `Certificate` value
//! - Validity window and refresh interval checks (`trust`)
//! - Public key extraction from X.509, SPKI and PKCS#1 DER (`key_parser`)
//! - RSAES-PKCS1-v1_5 session key encryption (`session_key`)
//!
//! Every operation is a pure function of its inputs. The current time and the
//! time a certificate was fetched are passed in explicitly.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use payment_crypto::{Certificate, SessionKeyEncryptor, TrustEvaluator};
//!
//! fn session_payload(
//!     cert: &Certificate,
//!     fetched_at: chrono::DateTime<Utc>,
//!     session_key: &[u8],
//! ) -> Result<Option<String>, payment_crypto::CryptoError> {
//!     let assessment = TrustEvaluator::default().assess(cert, Utc::now(), fetched_at)?;
//!     if assessment.requires_refresh() {
//!         // Caller fetches a new certificate first
//!         return Ok(None);
//!     }
//!
//!     SessionKeyEncryptor::default().encrypt(cert, session_key).map(Some)
//! }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod certificate;
pub mod config;
pub mod error;
pub mod hex;
pub mod key_parser;
pub mod session_key;
pub mod trust;

#[cfg(test)]
mod test_support;

pub use certificate::{parse_validity_date, Certificate, ValidityBound, ValidityWindow};
pub use config::SessionCryptoConfig;
pub use error::*;
pub use key_parser::{
    Pkcs1PublicKeyParser, PublicKeyEncoding, PublicKeyParser, SubjectPublicKeyInfoParser,
    X509CertificateParser,
};
pub use session_key::{encrypt_session_key, SessionKeyEncryptor, SESSION_KEY_PADDING};
pub use trust::{is_trusted, should_update, TrustAssessment, TrustEvaluator};
