use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Certificate validation failed: {0}")]
    Validation(String),

    #[error("Invalid key material: {0}")]
    KeyFormat(String),

    #[error("Session key too large: at most {max} bytes fit the key, got {actual}")]
    KeySize { max: usize, actual: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CryptoError {
    /// Stable error code, suitable for mapping to UI states.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CryptoError::Validation(_) => "VALIDATION_ERROR",
            CryptoError::KeyFormat(_) => "KEY_FORMAT_ERROR",
            CryptoError::KeySize { .. } => "KEY_SIZE_ERROR",
            CryptoError::EncryptionFailed(_) => "ENCRYPTION_FAILED",
            CryptoError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_message() {
        let err = CryptoError::KeySize { max: 245, actual: 300 };
        assert_eq!(
            err.to_string(),
            "Session key too large: at most 245 bytes fit the key, got 300"
        );
        assert_eq!(err.kind(), "KEY_SIZE_ERROR");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            CryptoError::InvalidArgument(String::new()).kind(),
            CryptoError::Validation(String::new()).kind(),
            CryptoError::KeyFormat(String::new()).kind(),
            CryptoError::KeySize { max: 0, actual: 0 }.kind(),
            CryptoError::EncryptionFailed(String::new()).kind(),
            CryptoError::Configuration(String::new()).kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
