use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha256;

use crate::domain::user::ports::AvatarResolver;

/// Derives a gravatar-style avatar URL from the account email.
///
/// Pure URL construction, no network round-trip; gravatar serves a generated
/// identicon when no image is registered for the hash.
pub struct GravatarResolver;

impl GravatarResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GravatarResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarResolver for GravatarResolver {
    async fn resolve(&self, email: &str) -> Option<String> {
        Some(gravatar_url(email))
    }
}

fn gravatar_url(email: &str) -> String {
    // Gravatar hashes the trimmed, lowercased address
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon",
        hex::encode(digest)
    )
}
