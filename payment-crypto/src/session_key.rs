//! Session key encryption under a gateway certificate.
//!
//! The ciphertext is produced with RSAES-PKCS1-v1_5, the padding the gateway
//! decrypts with, and handed back as lowercase hex. Trust and freshness are not
//! checked here; the key material itself always is.

use crate::certificate::Certificate;
use crate::config::SessionCryptoConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::hex;
use crate::key_parser::{decode_key_material, parse_with, PublicKeyEncoding, PublicKeyParser};
use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use std::fmt;

/// Padding scheme agreed with the gateway
pub const SESSION_KEY_PADDING: &str = "RSAES-PKCS1-v1_5";

/// Bytes of every RSA block consumed by PKCS#1 v1.5 encryption padding
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// Encrypts session keys under the public key carried by a [`Certificate`]
pub struct SessionKeyEncryptor {
    parsers: Vec<Box<dyn PublicKeyParser>>,
    min_modulus_bits: usize,
}

impl fmt::Debug for SessionKeyEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encodings: Vec<PublicKeyEncoding> = self.parsers.iter().map(|p| p.encoding()).collect();
        f.debug_struct("SessionKeyEncryptor")
            .field("encodings", &encodings)
            .field("min_modulus_bits", &self.min_modulus_bits)
            .finish()
    }
}

impl Default for SessionKeyEncryptor {
    fn default() -> Self {
        Self::from_validated(&SessionCryptoConfig::default())
    }
}

impl SessionKeyEncryptor {
    pub fn new(config: &SessionCryptoConfig) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &SessionCryptoConfig) -> Self {
        Self {
            parsers: config.key_encodings.iter().map(|e| e.parser()).collect(),
            min_modulus_bits: config.min_modulus_bits,
        }
    }

    /// Use a custom set of parsers, tried in order
    pub fn with_parsers(mut self, parsers: Vec<Box<dyn PublicKeyParser>>) -> Self {
        self.parsers = parsers;
        self
    }

    /// Decode and parse the certificate's key material.
    ///
    /// Useful for rejecting a freshly fetched certificate before caching it.
    ///
    /// # Errors
    ///
    /// [`CryptoError::KeyFormat`] when the material is not base64, matches no
    /// configured encoding, or carries a modulus below the configured minimum.
    pub fn parse_public_key(&self, cert: &Certificate) -> CryptoResult<RsaPublicKey> {
        let result = decode_key_material(cert.public_key_material())
            .and_then(|der| parse_with(&self.parsers, &der))
            .and_then(|(key, encoding)| {
                let bits = key.n().bits();
                if bits < self.min_modulus_bits {
                    return Err(CryptoError::KeyFormat(format!(
                        "RSA modulus of {} bits is below the required {}",
                        bits, self.min_modulus_bits
                    )));
                }

                tracing::debug!(
                    fingerprint = %cert.fingerprint(),
                    encoding = %encoding,
                    modulus_bits = bits,
                    "Parsed gateway public key"
                );
                Ok(key)
            });

        if let Err(e) = &result {
            tracing::warn!(
                fingerprint = %cert.fingerprint(),
                error = %e,
                "Rejected certificate key material"
            );
        }

        result
    }

    /// Largest session key, in bytes, the certificate's key can carry
    pub fn max_session_key_len(&self, cert: &Certificate) -> CryptoResult<usize> {
        let key = self.parse_public_key(cert)?;
        Ok(max_plaintext_len(&key))
    }

    /// Encrypt `session_key` for the gateway and return lowercase hex.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::KeyFormat`] for unusable key material
    /// - [`CryptoError::KeySize`] when the session key does not fit one RSA block
    /// - [`CryptoError::InvalidArgument`] for an empty session key
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use payment_crypto::{Certificate, SessionKeyEncryptor};
    ///
    /// let cert = Certificate::new(
    ///     "fingerprint",
    ///     "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA...",
    ///     "2020-01-01",
    ///     "2030-12-31",
    ///     86_400,
    /// );
    /// let payload = SessionKeyEncryptor::default().encrypt(&cert, &[0u8; 16])?;
    /// assert_eq!(payload.len(), 512);
    /// # Ok::<(), payment_crypto::CryptoError>(())
    /// ```
    pub fn encrypt(&self, cert: &Certificate, session_key: &[u8]) -> CryptoResult<String> {
        self.encrypt_with_rng(cert, session_key, &mut rand::thread_rng())
    }

    /// [`Self::encrypt`] with a caller supplied CSPRNG for the padding bytes
    pub fn encrypt_with_rng<R>(
        &self,
        cert: &Certificate,
        session_key: &[u8],
        rng: &mut R,
    ) -> CryptoResult<String>
    where
        R: CryptoRng + RngCore,
    {
        if session_key.is_empty() {
            return Err(CryptoError::InvalidArgument(
                "session key must not be empty".to_string(),
            ));
        }

        let public_key = self.parse_public_key(cert)?;

        let max = max_plaintext_len(&public_key);
        if session_key.len() > max {
            return Err(CryptoError::KeySize {
                max,
                actual: session_key.len(),
            });
        }

        let ciphertext = public_key
            .encrypt(rng, Pkcs1v15Encrypt, session_key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        tracing::debug!(
            fingerprint = %cert.fingerprint(),
            padding = SESSION_KEY_PADDING,
            ciphertext_len = ciphertext.len(),
            "Encrypted session key"
        );

        hex::encode(&ciphertext, ciphertext.len())
    }
}

fn max_plaintext_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(PKCS1_V15_OVERHEAD)
}

/// [`SessionKeyEncryptor::encrypt`] with the default configuration
pub fn encrypt_session_key(cert: &Certificate, session_key: &[u8]) -> CryptoResult<String> {
    SessionKeyEncryptor::default().encrypt(cert, session_key)
}
