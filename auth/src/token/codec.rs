use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenScope;
use super::errors::TokenError;

/// Signs and verifies scope-tagged tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a process-wide symmetric secret fixed
/// at construction. The codec holds no mutable state and is safe to share
/// across concurrent callers without locking.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// TokenCodec instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    /// - Rotate secrets periodically
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a signed token for a subject.
    ///
    /// Stamps `iat = now` and `exp = now + ttl`, falling back to the scope's
    /// default validity window when no TTL is supplied (access 15 minutes,
    /// refresh and email confirmation 7 days).
    ///
    /// # Arguments
    /// * `sub` - Subject (account email) the token is issued for
    /// * `scope` - Purpose the token is authorized for
    /// * `ttl` - Optional override of the scope's default TTL
    ///
    /// # Returns
    /// Compact encoded token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn create(
        &self,
        sub: &str,
        scope: TokenScope,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = ttl.unwrap_or_else(|| scope.default_ttl());

        let claims = Claims {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            scope,
        };

        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token against the scope an operation requires.
    ///
    /// # Arguments
    /// * `token` - Compact encoded token string
    /// * `expected_scope` - Scope the consuming operation requires
    ///
    /// # Returns
    /// The token's subject
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify or payload is malformed
    /// * `Expired` - Token expiry has passed (checked before scope)
    /// * `ScopeMismatch` - Payload scope differs from `expected_scope`
    pub fn verify(&self, token: &str, expected_scope: TokenScope) -> Result<String, TokenError> {
        let claims = self.decode_any(token)?;

        if claims.scope != expected_scope {
            return Err(TokenError::ScopeMismatch {
                expected: expected_scope,
                actual: claims.scope,
            });
        }

        Ok(claims.sub)
    }

    /// Decode and validate a token without requiring a particular scope.
    ///
    /// Signature and expiry are still enforced; callers inspect the returned
    /// claims to decide what the token is good for.
    ///
    /// # Arguments
    /// * `token` - Compact encoded token string
    ///
    /// # Returns
    /// The verified claim set
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify or payload is malformed
    /// * `Expired` - Token expiry has passed
    pub fn decode_any(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is exact; the default 60s leeway would let a just-expired
        // token through.
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::InvalidSignature,
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_create_and_verify_round_trip() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .create("a@x.com", TokenScope::Access, Some(Duration::seconds(900)))
            .expect("Failed to create token");

        let sub = codec
            .verify(&token, TokenScope::Access)
            .expect("Failed to verify token");
        assert_eq!(sub, "a@x.com");
    }

    #[test]
    fn test_scope_isolation() {
        let codec = TokenCodec::new(SECRET);

        let refresh = codec
            .create("a@x.com", TokenScope::Refresh, None)
            .expect("Failed to create token");
        let access = codec
            .create("a@x.com", TokenScope::Access, None)
            .expect("Failed to create token");

        assert_eq!(
            codec.verify(&refresh, TokenScope::Access),
            Err(TokenError::ScopeMismatch {
                expected: TokenScope::Access,
                actual: TokenScope::Refresh,
            })
        );
        assert_eq!(
            codec.verify(&access, TokenScope::Refresh),
            Err(TokenError::ScopeMismatch {
                expected: TokenScope::Refresh,
                actual: TokenScope::Access,
            })
        );
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(SECRET);

        // Already expired at issuance
        let token = codec
            .create("a@x.com", TokenScope::Access, Some(Duration::seconds(-1)))
            .expect("Failed to create token");

        // Expiry wins regardless of scope match
        assert_eq!(
            codec.verify(&token, TokenScope::Access),
            Err(TokenError::Expired)
        );
        assert_eq!(
            codec.verify(&token, TokenScope::Refresh),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1
            .create("a@x.com", TokenScope::Access, None)
            .expect("Failed to create token");

        assert_eq!(
            codec2.verify(&token, TokenScope::Access),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_token_is_invalid_signature() {
        let codec = TokenCodec::new(SECRET);

        assert_eq!(
            codec.verify("not.a.token", TokenScope::Access),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_decode_any_exposes_claims() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .create("b@x.com", TokenScope::EmailConfirm, None)
            .expect("Failed to create token");

        let claims = codec.decode_any(&token).expect("Failed to decode token");
        assert_eq!(claims.sub, "b@x.com");
        assert_eq!(claims.scope, TokenScope::EmailConfirm);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }
}
