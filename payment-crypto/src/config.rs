//! Session crypto configuration
//!
//! Covers the knobs the gateway contract leaves to the client:
//! - Textual format of certificate validity dates
//! - Minimum accepted RSA modulus size
//! - Which public-key encodings are tried, and in which order
//!
//! The padding scheme is deliberately absent: it is fixed by the wire contract.

use crate::error::{CryptoError, CryptoResult};
use crate::key_parser::PublicKeyEncoding;
use serde::{Deserialize, Serialize};

/// Default chrono format for `validFrom` / `validTo` when they are not RFC 3339
pub const DEFAULT_VALIDITY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default minimum RSA modulus size in bits
pub const DEFAULT_MIN_MODULUS_BITS: usize = 2048;

/// Smallest value `min_modulus_bits` may be configured to
pub const MIN_ALLOWED_MODULUS_BITS: usize = 1024;

/// Session crypto configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCryptoConfig {
    /// chrono format string used for validity dates that are not RFC 3339
    pub validity_date_format: String,

    /// Keys with a smaller modulus are rejected as unusable key material
    pub min_modulus_bits: usize,

    /// Encodings tried, in order, when parsing certificate key material
    pub key_encodings: Vec<PublicKeyEncoding>,
}

impl Default for SessionCryptoConfig {
    fn default() -> Self {
        Self {
            validity_date_format: DEFAULT_VALIDITY_DATE_FORMAT.to_string(),
            min_modulus_bits: DEFAULT_MIN_MODULUS_BITS,
            key_encodings: vec![
                PublicKeyEncoding::X509Certificate,
                PublicKeyEncoding::SubjectPublicKeyInfo,
                PublicKeyEncoding::Pkcs1,
            ],
        }
    }
}

impl SessionCryptoConfig {
    /// Validate the configuration
    pub fn validate(&self) -> CryptoResult<()> {
        if self.validity_date_format.trim().is_empty() {
            return Err(CryptoError::Configuration(
                "validity_date_format must not be empty".to_string(),
            ));
        }

        if self.min_modulus_bits < MIN_ALLOWED_MODULUS_BITS {
            return Err(CryptoError::Configuration(format!(
                "min_modulus_bits must be at least {}, got {}",
                MIN_ALLOWED_MODULUS_BITS, self.min_modulus_bits
            )));
        }

        if self.key_encodings.is_empty() {
            return Err(CryptoError::Configuration(
                "at least one key encoding must be enabled".to_string(),
            ));
        }

        for (i, encoding) in self.key_encodings.iter().enumerate() {
            if self.key_encodings.iter().take(i).any(|seen| seen == encoding) {
                return Err(CryptoError::Configuration(format!(
                    "key encoding {} is listed more than once",
                    encoding
                )));
            }
        }

        Ok(())
    }

    /// Restrict parsing to a single encoding
    pub fn with_key_encoding(mut self, encoding: PublicKeyEncoding) -> Self {
        self.key_encodings = vec![encoding];
        self
    }
}
