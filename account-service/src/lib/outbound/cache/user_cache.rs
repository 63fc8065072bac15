use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserCache;
use crate::user::errors::AuthError;
use crate::user::errors::CacheError;

/// Redis-backed user snapshot cache.
///
/// Entries live under `user:{email}` as JSON snapshots with a fixed TTL and
/// expire on their own; nothing invalidates them when the underlying row
/// changes. `ConnectionManager` multiplexes one connection across tasks and is
/// cloned per command, so no request ever blocks on another's round-trip.
pub struct RedisUserCache {
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisUserCache {
    /// Create a cache handle over an established Redis connection.
    ///
    /// # Arguments
    /// * `connection` - Multiplexed Redis connection
    /// * `ttl_seconds` - Snapshot lifetime (the service default is 900)
    pub fn new(connection: ConnectionManager, ttl_seconds: u64) -> Self {
        Self {
            connection,
            ttl_seconds,
        }
    }

    fn key(email: &str) -> String {
        format!("user:{}", email)
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, email: &str) -> Result<Option<User>, CacheError> {
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection
            .get(Self::key(email))
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let snapshot: UserSnapshot = serde_json::from_str(&payload)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        snapshot
            .try_into()
            .map(Some)
            .map_err(|e: AuthError| CacheError::Serialization(e.to_string()))
    }

    async fn set(&self, user: &User) -> Result<(), CacheError> {
        let payload = serde_json::to_string(&UserSnapshot::from(user))
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut connection = self.connection.clone();

        let _: () = connection
            .set_ex(Self::key(user.email.as_str()), payload, self.ttl_seconds)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

/// Serialized form of a cached user.
///
/// Plain fields only; domain value types are re-validated on the way back out.
#[derive(Debug, Serialize, Deserialize)]
struct UserSnapshot {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    avatar: Option<String>,
    refresh_token: Option<String>,
    confirmed: bool,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
            avatar: user.avatar.clone(),
            refresh_token: user.refresh_token.clone(),
            confirmed: user.confirmed,
        }
    }
}

impl TryFrom<UserSnapshot> for User {
    type Error = AuthError;

    fn try_from(snapshot: UserSnapshot) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(snapshot.id),
            username: Username::new(snapshot.username)?,
            email: EmailAddress::new(snapshot.email)?,
            password_hash: snapshot.password_hash,
            created_at: snapshot.created_at,
            avatar: snapshot.avatar,
            refresh_token: snapshot.refresh_token,
            confirmed: snapshot.confirmed,
        })
    }
}
