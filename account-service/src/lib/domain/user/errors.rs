use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for cache-store operations.
///
/// Kept apart from credential failures so operators can tell "wrong password"
/// from "the cache is down".
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize cached snapshot: {0}")]
    Serialization(String),
}

/// Error for confirmation-email delivery.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Failed to build confirmation message: {0}")]
    InvalidMessage(String),

    #[error("Failed to send confirmation email: {0}")]
    SendFailed(String),
}

/// Top-level error for authentication and account operations.
///
/// Login-time failures are deliberately precise (each names the credential
/// component that failed); access-token failures collapse into the single
/// `CredentialsNotValidated` so signature, expiry, scope, and unknown-subject
/// failures are indistinguishable to the caller.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(#[from] EmailError),

    // Login-time failures, each user-visible with a distinct message
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    // Unified access-token rejection
    #[error("Could not validate credentials")]
    CredentialsNotValidated,

    // Refresh path: wrong scope is distinguished from other failures
    #[error("Invalid scope for token")]
    InvalidRefreshScope,

    // Email-confirmation path
    #[error("Invalid token for email verification")]
    InvalidConfirmationToken,

    #[error("Verification error")]
    VerificationError,

    // Signup
    #[error("Account already exists: {0}")]
    EmailAlreadyExists(String),

    // Infrastructure errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),
}
