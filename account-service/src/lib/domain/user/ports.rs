use async_trait::async_trait;

use crate::domain::user::models::ConfirmationStatus;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::TokenPair;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::errors::CacheError;
use crate::user::errors::NotifierError;

/// Port for authentication and account operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// Hashes the password, enriches the account with a best-effort avatar,
    /// persists it unconfirmed, and sends a confirmation email
    /// (fire-and-forget; delivery failure never fails the registration).
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Database` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError>;

    /// Authenticate credentials and issue an access/refresh token pair.
    ///
    /// Always reads the account fresh from the repository, never the cache.
    ///
    /// # Arguments
    /// * `email` - Account email
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Access and refresh tokens with a `bearer` type label
    ///
    /// # Errors
    /// * `InvalidEmail` - No account with this email
    /// * `EmailNotConfirmed` - Account exists but is not confirmed
    /// * `InvalidPassword` - Password does not match
    /// * `Database` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a fresh access token.
    ///
    /// # Arguments
    /// * `refresh_token` - Token issued at login with the refresh scope
    ///
    /// # Returns
    /// Newly issued access token for the same subject
    ///
    /// # Errors
    /// * `InvalidRefreshScope` - Token carries a different scope
    /// * `CredentialsNotValidated` - Signature or expiry check failed
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Resolve the caller's identity from a bearer access token.
    ///
    /// Verifies the token, then resolves the subject through the TTL-bounded
    /// user cache (read-through on miss).
    ///
    /// # Arguments
    /// * `token` - Bearer token presented on a protected request
    ///
    /// # Returns
    /// The authenticated user
    ///
    /// # Errors
    /// * `CredentialsNotValidated` - Any token failure or unknown subject
    /// * `Cache` / `Database` - Infrastructure failure (never mapped to an
    ///   authentication failure)
    async fn current_user(&self, token: &str) -> Result<User, AuthError>;

    /// Consume an email-confirmation token and mark the account confirmed.
    ///
    /// # Arguments
    /// * `token` - Token embedded in the confirmation link
    ///
    /// # Returns
    /// Whether the account was confirmed now or already was
    ///
    /// # Errors
    /// * `InvalidConfirmationToken` - Any token failure
    /// * `VerificationError` - Token subject does not match an account
    /// * `Database` - Database operation failed
    async fn confirm_email(&self, token: &str) -> Result<ConfirmationStatus, AuthError>;

    /// Re-send the confirmation email for an unconfirmed account.
    ///
    /// An unknown email is reported as `Pending` so the endpoint does not
    /// reveal which addresses have accounts.
    ///
    /// # Arguments
    /// * `email` - Account email
    ///
    /// # Returns
    /// `AlreadyConfirmed` or `Pending`
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn request_confirmation(&self, email: &str) -> Result<ConfirmationStatus, AuthError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - User entity to create
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Database` - Database operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve user by email address.
    ///
    /// # Arguments
    /// * `email` - Email address string
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Store (or clear) the refresh token issued at login.
    ///
    /// # Arguments
    /// * `id` - User ID
    /// * `token` - Refresh token, or None to clear
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn update_refresh_token(&self, id: &UserId, token: Option<String>)
        -> Result<(), AuthError>;

    /// Flip the account's confirmed flag.
    ///
    /// # Arguments
    /// * `email` - Email of the account to confirm
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn confirm_email(&self, email: &str) -> Result<(), AuthError>;
}

/// TTL-bounded cache of user snapshots keyed by email.
///
/// Entries are never invalidated on mutation; readers within the TTL window
/// observe the stale snapshot.
#[async_trait]
pub trait UserCache: Send + Sync + 'static {
    /// Look up a cached snapshot.
    ///
    /// # Arguments
    /// * `email` - Email the snapshot was cached under
    ///
    /// # Returns
    /// The cached user, or None on miss or expiry
    ///
    /// # Errors
    /// * `Unavailable` - Cache store could not be reached
    /// * `Serialization` - Stored snapshot could not be decoded
    async fn get(&self, email: &str) -> Result<Option<User>, CacheError>;

    /// Cache a snapshot under the user's email for the configured TTL.
    ///
    /// # Arguments
    /// * `user` - User entity to snapshot
    ///
    /// # Errors
    /// * `Unavailable` - Cache store could not be reached
    /// * `Serialization` - Snapshot could not be encoded
    async fn set(&self, user: &User) -> Result<(), CacheError>;
}

/// Outbound delivery of confirmation emails.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync + 'static {
    /// Send a confirmation link for the given token.
    ///
    /// # Arguments
    /// * `email` - Recipient address
    /// * `username` - Recipient display name
    /// * `token` - Email-confirmation token to embed in the link
    ///
    /// # Errors
    /// * `InvalidMessage` - Message could not be built
    /// * `SendFailed` - Transport-level delivery failure
    async fn send_confirmation(
        &self,
        email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), NotifierError>;
}

/// Best-effort avatar enrichment at registration.
#[async_trait]
pub trait AvatarResolver: Send + Sync + 'static {
    /// Resolve an avatar URL for an email, if one can be derived.
    ///
    /// Absence must not fail account creation.
    async fn resolve(&self, email: &str) -> Option<String>;
}
