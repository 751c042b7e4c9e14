//! Public key extraction from gateway key material.
//!
//! Each supported DER encoding has its own [`PublicKeyParser`]; all of them
//! yield an [`RsaPublicKey`].

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

/// DER encodings the gateway may deliver key material in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicKeyEncoding {
    /// X.509 certificate carrying an RSA SubjectPublicKeyInfo
    #[serde(rename = "x509", alias = "certificate")]
    X509Certificate,
    /// Bare SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`)
    #[serde(rename = "spki", alias = "pkcs8")]
    SubjectPublicKeyInfo,
    /// PKCS#1 RSAPublicKey (`BEGIN RSA PUBLIC KEY`)
    #[serde(rename = "pkcs1")]
    Pkcs1,
}

impl PublicKeyEncoding {
    /// Parser for this encoding
    pub fn parser(self) -> Box<dyn PublicKeyParser> {
        match self {
            PublicKeyEncoding::X509Certificate => Box::new(X509CertificateParser),
            PublicKeyEncoding::SubjectPublicKeyInfo => Box::new(SubjectPublicKeyInfoParser),
            PublicKeyEncoding::Pkcs1 => Box::new(Pkcs1PublicKeyParser),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PublicKeyEncoding::X509Certificate => "x509",
            PublicKeyEncoding::SubjectPublicKeyInfo => "spki",
            PublicKeyEncoding::Pkcs1 => "pkcs1",
        }
    }
}

impl fmt::Display for PublicKeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicKeyEncoding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x509" | "x.509" | "certificate" => Ok(PublicKeyEncoding::X509Certificate),
            "spki" | "pkcs8" | "subject-public-key-info" => {
                Ok(PublicKeyEncoding::SubjectPublicKeyInfo)
            }
            "pkcs1" | "rsa" => Ok(PublicKeyEncoding::Pkcs1),
            _ => Err(CryptoError::Configuration(format!(
                "Unknown key encoding: {}. Valid options: x509, spki, pkcs1",
                s
            ))),
        }
    }
}

/// Turns DER bytes of one specific encoding into an RSA public key
pub trait PublicKeyParser: Send + Sync {
    /// Encoding this parser understands
    fn encoding(&self) -> PublicKeyEncoding;

    /// Parse DER bytes into an RSA public key
    fn parse(&self, der: &[u8]) -> CryptoResult<RsaPublicKey>;
}

/// Extracts the RSA key embedded in a DER X.509 certificate
#[derive(Debug, Default, Clone, Copy)]
pub struct X509CertificateParser;

impl PublicKeyParser for X509CertificateParser {
    fn encoding(&self) -> PublicKeyEncoding {
        PublicKeyEncoding::X509Certificate
    }

    fn parse(&self, der: &[u8]) -> CryptoResult<RsaPublicKey> {
        let (rest, cert) = X509Certificate::from_der(der)
            .map_err(|e| CryptoError::KeyFormat(format!("not an X.509 certificate: {}", e)))?;

        if !rest.is_empty() {
            return Err(CryptoError::KeyFormat(format!(
                "{} trailing bytes after X.509 certificate",
                rest.len()
            )));
        }

        SubjectPublicKeyInfoParser
            .parse(cert.public_key().raw)
            .map_err(|e| match e {
                CryptoError::KeyFormat(msg) => {
                    CryptoError::KeyFormat(format!("certificate public key: {}", msg))
                }
                other => other,
            })
    }
}

/// Parses a DER SubjectPublicKeyInfo holding an RSA key
#[derive(Debug, Default, Clone, Copy)]
pub struct SubjectPublicKeyInfoParser;

impl PublicKeyParser for SubjectPublicKeyInfoParser {
    fn encoding(&self) -> PublicKeyEncoding {
        PublicKeyEncoding::SubjectPublicKeyInfo
    }

    fn parse(&self, der: &[u8]) -> CryptoResult<RsaPublicKey> {
        RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::KeyFormat(format!("not an RSA SubjectPublicKeyInfo: {}", e)))
    }
}

/// Parses a DER PKCS#1 RSAPublicKey
#[derive(Debug, Default, Clone, Copy)]
pub struct Pkcs1PublicKeyParser;

impl PublicKeyParser for Pkcs1PublicKeyParser {
    fn encoding(&self) -> PublicKeyEncoding {
        PublicKeyEncoding::Pkcs1
    }

    fn parse(&self, der: &[u8]) -> CryptoResult<RsaPublicKey> {
        RsaPublicKey::from_pkcs1_der(der)
            .map_err(|e| CryptoError::KeyFormat(format!("not a PKCS#1 RSA public key: {}", e)))
    }
}

/// Decode base64 key material into DER bytes.
///
/// PEM armour lines (`-----BEGIN ...-----`) and all whitespace are ignored, so
/// both bare base64 and PEM bodies are accepted.
pub fn decode_key_material(material: &str) -> CryptoResult<Vec<u8>> {
    let body: String = material
        .lines()
        .filter(|line| !line.trim_start().starts_with("-----"))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();

    if body.is_empty() {
        return Err(CryptoError::KeyFormat("key material is empty".to_string()));
    }

    BASE64
        .decode(body.as_bytes())
        .map_err(|e| CryptoError::KeyFormat(format!("key material is not valid base64: {}", e)))
}

/// Try each parser in order and return the first key that parses.
pub fn parse_with(
    parsers: &[Box<dyn PublicKeyParser>],
    der: &[u8],
) -> CryptoResult<(RsaPublicKey, PublicKeyEncoding)> {
    let mut failures = Vec::with_capacity(parsers.len());

    for parser in parsers {
        match parser.parse(der) {
            Ok(key) => return Ok((key, parser.encoding())),
            Err(e) => failures.push(format!("{}: {}", parser.encoding(), e)),
        }
    }

    if failures.is_empty() {
        return Err(CryptoError::KeyFormat("no key parsers configured".to_string()));
    }

    Err(CryptoError::KeyFormat(format!(
        "unsupported key material ({})",
        failures.join("; ")
    )))
}
