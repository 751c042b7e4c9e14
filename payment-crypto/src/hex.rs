//! Lowercase hexadecimal rendering of byte buffers.
//!
//! The gateway receives encrypted session keys as hex text. `encode` takes an
//! explicit length so callers holding fixed-size buffers never render more
//! than they intend.

use crate::error::{CryptoError, CryptoResult};

/// Encode the first `length` bytes of `bytes` as lowercase hex.
///
/// Output is exactly `2 * length` characters, most significant nibble first,
/// with no separators or prefix.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] when `length` exceeds the buffer.
///
/// # Example
///
/// ```rust
/// use payment_crypto::hex;
///
/// let buffer = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x00];
/// assert_eq!(hex::encode(&buffer, 4).unwrap(), "deadbeef");
/// ```
pub fn encode(bytes: &[u8], length: usize) -> CryptoResult<String> {
    let prefix = bytes.get(..length).ok_or_else(|| {
        CryptoError::InvalidArgument(format!(
            "cannot encode {} bytes from a buffer of {}",
            length,
            bytes.len()
        ))
    })?;

    Ok(::hex::encode(prefix))
}

/// Encode a whole buffer as lowercase hex.
pub fn encode_all(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Decode hex text back into bytes. Upper and lower case digits are accepted.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidArgument`] for odd-length input or non-hex
/// characters.
pub fn decode(text: &str) -> CryptoResult<Vec<u8>> {
    ::hex::decode(text)
        .map_err(|e| CryptoError::InvalidArgument(format!("invalid hex string: {}", e)))
}
