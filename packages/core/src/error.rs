// Типы ошибок публичной криптографии

use thiserror::Error;

/// Errors produced by the public-key layer.
///
/// Verification never surfaces these: `Verifier::check_signature` folds every
/// variant into `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Malformed input bytes where a well-defined structure was expected.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Unsupported capability or scheme, or a nonsensical combination of options.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A length precondition was violated while producing output.
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Failed to generate key: {0}")]
    KeyGeneration(String),

    /// A backend consistency check failed. Indicates a defect, not bad input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CryptoError {
    pub(crate) fn unsupported(algorithm: &str, capability: &str) -> Self {
        CryptoError::InvalidArgument(format!(
            "Key type {} does not support {}",
            algorithm, capability
        ))
    }

    pub(crate) fn unknown_scheme(algorithm: &str, scheme: &str) -> Self {
        CryptoError::InvalidArgument(format!(
            "{} does not support scheme '{}'",
            algorithm, scheme
        ))
    }
}

impl From<der::Error> for CryptoError {
    fn from(err: der::Error) -> Self {
        CryptoError::Decoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
