use thiserror::Error;

use super::claims::TokenScope;

/// Error type for token operations.
///
/// The three verification failures are deliberately distinct: callers map
/// them to different HTTP outcomes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid or payload is malformed")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Invalid scope for token: expected {expected}, got {actual}")]
    ScopeMismatch {
        expected: TokenScope,
        actual: TokenScope,
    },
}
