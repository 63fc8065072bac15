//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for services:
//! - Password hashing (Argon2id)
//! - Scope-tagged token generation and validation (JWT, HS256)
//!
//! Each service defines its own authentication traits and adapts these implementations.
//! This avoids coupling services through shared domain logic while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Scoped Tokens
//! ```
//! use auth::{TokenCodec, TokenScope};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Login: issue an access/refresh pair
//! let access = codec.create("user@example.com", TokenScope::Access, None).unwrap();
//! let refresh = codec.create("user@example.com", TokenScope::Refresh, None).unwrap();
//!
//! // Protected request: the token must carry the access scope
//! let sub = codec.verify(&access, TokenScope::Access).unwrap();
//! assert_eq!(sub, "user@example.com");
//!
//! // A refresh token presented as an access token is rejected
//! assert!(codec.verify(&refresh, TokenScope::Access).is_err());
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenScope;
