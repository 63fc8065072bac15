use std::fmt;

use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

/// Purpose tag carried by every signed token.
///
/// Verification requires the scope in the payload to match the operation the
/// token is presented for; an access token cannot be spent as a refresh token
/// and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    /// Short-lived token resolving the caller's identity on each request.
    #[serde(rename = "access_token")]
    Access,

    /// Longer-lived token exchanged for a fresh access token.
    #[serde(rename = "refresh_token")]
    Refresh,

    /// Token embedded in an email-confirmation link.
    #[serde(rename = "email_token")]
    EmailConfirm,
}

impl TokenScope {
    /// Default validity window for tokens of this scope.
    pub fn default_ttl(&self) -> Duration {
        match self {
            TokenScope::Access => Duration::minutes(15),
            TokenScope::Refresh => Duration::days(7),
            TokenScope::EmailConfirm => Duration::days(7),
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenScope::Access => "access_token",
            TokenScope::Refresh => "refresh_token",
            TokenScope::EmailConfirm => "email_token",
        };
        name.fmt(f)
    }
}

/// Claim set signed into every token.
///
/// Immutable once signed; validity is a pure function of current time and
/// signature correctness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (the account's email address)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Purpose the token is authorized for
    pub scope: TokenScope,
}
