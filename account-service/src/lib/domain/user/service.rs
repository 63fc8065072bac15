use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenError;
use auth::TokenScope;
use chrono::Utc;

use crate::domain::user::models::ConfirmationStatus;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::TokenPair;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::AvatarResolver;
use crate::user::ports::ConfirmationNotifier;
use crate::user::ports::UserCache;
use crate::user::ports::UserRepository;

/// Domain service implementation for authentication and account operations.
///
/// Concrete implementation of AuthServicePort with dependency injection: the
/// token codec, repository, cache, notifier, and avatar resolver are all
/// constructed at startup and passed in, never retrieved from global state.
pub struct AuthService<UR, UC, CN, AR>
where
    UR: UserRepository,
    UC: UserCache,
    CN: ConfirmationNotifier,
    AR: AvatarResolver,
{
    repository: Arc<UR>,
    cache: Arc<UC>,
    notifier: Arc<CN>,
    avatar_resolver: Arc<AR>,
    token_codec: TokenCodec,
    password_hasher: PasswordHasher,
}

impl<UR, UC, CN, AR> AuthService<UR, UC, CN, AR>
where
    UR: UserRepository,
    UC: UserCache,
    CN: ConfirmationNotifier,
    AR: AvatarResolver,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `cache` - TTL-bounded user snapshot cache
    /// * `notifier` - Confirmation email delivery
    /// * `avatar_resolver` - Best-effort avatar enrichment
    /// * `token_codec` - Codec holding the process-wide signing secret
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(
        repository: Arc<UR>,
        cache: Arc<UC>,
        notifier: Arc<CN>,
        avatar_resolver: Arc<AR>,
        token_codec: TokenCodec,
    ) -> Self {
        Self {
            repository,
            cache,
            notifier,
            avatar_resolver,
            token_codec,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Resolve a user by email through the cache, reading through to the
    /// repository on miss.
    ///
    /// A found user is cached for the configured TTL; absence is never
    /// cached, so every miss for an unknown email re-queries the repository.
    pub async fn load_user_cached(&self, email: &str) -> Result<Option<User>, AuthError> {
        if let Some(user) = self.cache.get(email).await? {
            return Ok(Some(user));
        }

        let Some(user) = self.repository.find_by_email(email).await? else {
            return Ok(None);
        };

        self.cache.set(&user).await?;

        Ok(Some(user))
    }

    /// Issue a confirmation token and hand it to the notifier.
    ///
    /// Fire-and-forget: failures are logged and never surfaced, so a broken
    /// mail relay cannot fail the operation that triggered the email.
    async fn send_confirmation(&self, user: &User) {
        let token = match self
            .token_codec
            .create(user.email.as_str(), TokenScope::EmailConfirm, None)
        {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(
                    "Failed to issue confirmation token for {}: {}",
                    user.email,
                    e
                );
                return;
            }
        };

        if let Err(e) = self
            .notifier
            .send_confirmation(user.email.as_str(), user.username.as_str(), &token)
            .await
        {
            tracing::error!("Failed to send confirmation email to {}: {}", user.email, e);
        }
    }
}

#[async_trait]
impl<UR, UC, CN, AR> AuthServicePort for AuthService<UR, UC, CN, AR>
where
    UR: UserRepository,
    UC: UserCache,
    CN: ConfirmationNotifier,
    AR: AvatarResolver,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;

        // Best-effort enrichment; None simply leaves the account without one
        let avatar = self.avatar_resolver.resolve(command.email.as_str()).await;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
            avatar,
            refresh_token: None,
            confirmed: false,
        };

        let created_user = self.repository.create(user).await?;

        self.send_confirmation(&created_user).await;

        Ok(created_user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        // Login must see fresh data, so the cache is bypassed
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidEmail)?;

        if !user.confirmed {
            return Err(AuthError::EmailNotConfirmed);
        }

        if !self.password_hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidPassword);
        }

        let access_token = self
            .token_codec
            .create(email, TokenScope::Access, None)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;
        let refresh_token = self
            .token_codec
            .create(email, TokenScope::Refresh, None)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

        // The previous refresh token is overwritten but not revoked; it stays
        // valid until its own expiry
        self.repository
            .update_refresh_token(&user.id, Some(refresh_token.clone()))
            .await?;

        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let email = self
            .token_codec
            .verify(refresh_token, TokenScope::Refresh)
            .map_err(|e| match e {
                TokenError::ScopeMismatch { .. } => AuthError::InvalidRefreshScope,
                _ => AuthError::CredentialsNotValidated,
            })?;

        self.token_codec
            .create(&email, TokenScope::Access, None)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))
    }

    async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        // Signature, expiry, and scope failures all collapse into the same
        // rejection so the response leaks nothing about the token
        let email = self
            .token_codec
            .verify(token, TokenScope::Access)
            .map_err(|_| AuthError::CredentialsNotValidated)?;

        if email.is_empty() {
            return Err(AuthError::CredentialsNotValidated);
        }

        self.load_user_cached(&email)
            .await?
            .ok_or(AuthError::CredentialsNotValidated)
    }

    async fn confirm_email(&self, token: &str) -> Result<ConfirmationStatus, AuthError> {
        let email = self
            .token_codec
            .verify(token, TokenScope::EmailConfirm)
            .map_err(|_| AuthError::InvalidConfirmationToken)?;

        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::VerificationError)?;

        if user.confirmed {
            return Ok(ConfirmationStatus::AlreadyConfirmed);
        }

        self.repository.confirm_email(&email).await?;

        Ok(ConfirmationStatus::Confirmed)
    }

    async fn request_confirmation(&self, email: &str) -> Result<ConfirmationStatus, AuthError> {
        // An unknown address reports Pending so the endpoint does not reveal
        // which emails have accounts
        let Some(user) = self.repository.find_by_email(email).await? else {
            return Ok(ConfirmationStatus::Pending);
        };

        if user.confirmed {
            return Ok(ConfirmationStatus::AlreadyConfirmed);
        }

        self.send_confirmation(&user).await;

        Ok(ConfirmationStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Username;
    use crate::user::errors::CacheError;
    use crate::user::errors::NotifierError;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AuthError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
            async fn update_refresh_token(&self, id: &UserId, token: Option<String>) -> Result<(), AuthError>;
            async fn confirm_email(&self, email: &str) -> Result<(), AuthError>;
        }
    }

    mock! {
        pub TestUserCache {}

        #[async_trait]
        impl UserCache for TestUserCache {
            async fn get(&self, email: &str) -> Result<Option<User>, CacheError>;
            async fn set(&self, user: &User) -> Result<(), CacheError>;
        }
    }

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl ConfirmationNotifier for TestNotifier {
            async fn send_confirmation(&self, email: &str, username: &str, token: &str) -> Result<(), NotifierError>;
        }
    }

    mock! {
        pub TestAvatarResolver {}

        #[async_trait]
        impl AvatarResolver for TestAvatarResolver {
            async fn resolve(&self, email: &str) -> Option<String>;
        }
    }

    type TestService =
        AuthService<MockTestUserRepository, MockTestUserCache, MockTestNotifier, MockTestAvatarResolver>;

    fn service(
        repository: MockTestUserRepository,
        cache: MockTestUserCache,
        notifier: MockTestNotifier,
        avatar_resolver: MockTestAvatarResolver,
    ) -> TestService {
        AuthService::new(
            Arc::new(repository),
            Arc::new(cache),
            Arc::new(notifier),
            Arc::new(avatar_resolver),
            TokenCodec::new(SECRET),
        )
    }

    fn test_user(email: &str, password: &str, confirmed: bool) -> User {
        User {
            id: UserId::new(),
            username: Username::new("testuser".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            created_at: Utc::now(),
            avatar: None,
            refresh_token: None,
            confirmed,
        }
    }

    fn register_command(email: &str) -> RegisterUserCommand {
        RegisterUserCommand::new(
            Username::new("testuser".to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            "password123".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let mut notifier = MockTestNotifier::new();
        let mut avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .with(eq("test@example.com"))
            .times(1)
            .returning(|_| Ok(None));

        avatar_resolver
            .expect_resolve()
            .with(eq("test@example.com"))
            .times(1)
            .returning(|_| Some("https://www.gravatar.com/avatar/abc".to_string()));

        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && !user.confirmed
                    && user.refresh_token.is_none()
                    && user.avatar.as_deref() == Some("https://www.gravatar.com/avatar/abc")
            })
            .times(1)
            .returning(|user| Ok(user));

        notifier
            .expect_send_confirmation()
            .withf(|email, username, token| {
                email == "test@example.com" && username == "testuser" && !token.is_empty()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, cache, notifier, avatar_resolver);

        let user = service
            .register(register_command("test@example.com"))
            .await
            .expect("registration failed");
        assert!(!user.confirmed);
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("test@example.com", "password123", true))));
        repository.expect_create().times(0);

        let service = service(repository, cache, notifier, avatar_resolver);

        let result = service.register(register_command("test@example.com")).await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_register_survives_notifier_failure() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let mut notifier = MockTestNotifier::new();
        let mut avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        avatar_resolver.expect_resolve().returning(|_| None);
        repository
            .expect_create()
            .times(1)
            .returning(|user| Ok(user));

        // Delivery failure is logged, never surfaced
        notifier
            .expect_send_confirmation()
            .times(1)
            .returning(|_, _, _| Err(NotifierError::SendFailed("relay down".to_string())));

        let service = service(repository, cache, notifier, avatar_resolver);

        let result = service.register(register_command("test@example.com")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, cache, notifier, avatar_resolver);

        let result = service.login("a@x.com", "correct").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidEmail));
    }

    #[tokio::test]
    async fn test_login_unconfirmed_account() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "correct", false))));

        let service = service(repository, cache, notifier, avatar_resolver);

        // Even with the correct password
        let result = service.login("a@x.com", "correct").await;
        assert!(matches!(result.unwrap_err(), AuthError::EmailNotConfirmed));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "correct", true))));

        let service = service(repository, cache, notifier, avatar_resolver);

        let result = service.login("a@x.com", "wrong").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_login_success_issues_token_pair() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let user = test_user("a@x.com", "correct", true);
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update_refresh_token()
            .withf(move |id, token| *id == user_id && token.is_some())
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, cache, notifier, avatar_resolver);

        let pair = service.login("a@x.com", "correct").await.expect("login failed");
        assert_eq!(pair.token_type, "bearer");

        // Both tokens decode to the login subject with their own scope
        let codec = TokenCodec::new(SECRET);
        assert_eq!(
            codec.verify(&pair.access_token, TokenScope::Access).unwrap(),
            "a@x.com"
        );
        assert_eq!(
            codec
                .verify(&pair.refresh_token, TokenScope::Refresh)
                .unwrap(),
            "a@x.com"
        );
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let service = service(repository, cache, notifier, avatar_resolver);

        let codec = TokenCodec::new(SECRET);
        let refresh_token = codec
            .create("a@x.com", TokenScope::Refresh, None)
            .unwrap();

        let access_token = service.refresh(&refresh_token).await.expect("refresh failed");

        let claims = codec.decode_any(&access_token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.scope, TokenScope::Access);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_scope() {
        let repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let service = service(repository, cache, notifier, avatar_resolver);

        let access_token = TokenCodec::new(SECRET)
            .create("a@x.com", TokenScope::Access, None)
            .unwrap();

        let result = service.refresh(&access_token).await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidRefreshScope));
    }

    #[tokio::test]
    async fn test_refresh_rejects_garbage_token() {
        let repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let service = service(repository, cache, notifier, avatar_resolver);

        let result = service.refresh("not.a.token").await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::CredentialsNotValidated
        ));
    }

    #[tokio::test]
    async fn test_current_user_cache_miss_reads_through() {
        let mut repository = MockTestUserRepository::new();
        let mut cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        cache
            .expect_get()
            .with(eq("b@x.com"))
            .times(1)
            .returning(|_| Ok(None));
        // Loader invoked exactly once
        repository
            .expect_find_by_email()
            .with(eq("b@x.com"))
            .times(1)
            .returning(|_| Ok(Some(test_user("b@x.com", "password123", true))));
        cache
            .expect_set()
            .withf(|user| user.email.as_str() == "b@x.com")
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("b@x.com", TokenScope::Access, None)
            .unwrap();

        let user = service.current_user(&token).await.expect("auth failed");
        assert_eq!(user.email.as_str(), "b@x.com");
    }

    #[tokio::test]
    async fn test_current_user_cache_hit_skips_loader() {
        let mut repository = MockTestUserRepository::new();
        let mut cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        // Stale snapshot: still unconfirmed in the cache. Within the TTL
        // window the snapshot wins; this is the accepted tradeoff.
        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some(test_user("b@x.com", "password123", false))));
        repository.expect_find_by_email().times(0);
        cache.expect_set().times(0);

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("b@x.com", TokenScope::Access, None)
            .unwrap();

        let user = service.current_user(&token).await.expect("auth failed");
        assert!(!user.confirmed);
    }

    #[tokio::test]
    async fn test_current_user_unknown_subject_not_cached() {
        let mut repository = MockTestUserRepository::new();
        let mut cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        cache.expect_get().times(1).returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        // Negative results are never cached
        cache.expect_set().times(0);

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("ghost@x.com", TokenScope::Access, None)
            .unwrap();

        let result = service.current_user(&token).await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::CredentialsNotValidated
        ));
    }

    #[tokio::test]
    async fn test_current_user_rejects_bad_tokens_uniformly() {
        let repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let service = service(repository, cache, notifier, avatar_resolver);

        let codec = TokenCodec::new(SECRET);
        let refresh_scoped = codec.create("a@x.com", TokenScope::Refresh, None).unwrap();
        let expired = codec
            .create("a@x.com", TokenScope::Access, Some(Duration::seconds(-1)))
            .unwrap();
        let forged = TokenCodec::new(b"other_secret_at_least_32_bytes_xx!")
            .create("a@x.com", TokenScope::Access, None)
            .unwrap();

        // Scope, expiry, and signature failures are indistinguishable
        for token in [refresh_scoped.as_str(), expired.as_str(), forged.as_str(), "junk"] {
            let result = service.current_user(token).await;
            assert!(matches!(
                result.unwrap_err(),
                AuthError::CredentialsNotValidated
            ));
        }
    }

    #[tokio::test]
    async fn test_current_user_cache_failure_is_not_auth_failure() {
        let repository = MockTestUserRepository::new();
        let mut cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        cache
            .expect_get()
            .times(1)
            .returning(|_| Err(CacheError::Unavailable("connection refused".to_string())));

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("b@x.com", TokenScope::Access, None)
            .unwrap();

        // Operators must be able to tell "cache down" from "bad token"
        let result = service.current_user(&token).await;
        assert!(matches!(result.unwrap_err(), AuthError::Cache(_)));
    }

    #[tokio::test]
    async fn test_confirm_email_success() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "password123", false))));
        repository
            .expect_confirm_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("a@x.com", TokenScope::EmailConfirm, None)
            .unwrap();

        let status = service.confirm_email(&token).await.expect("confirm failed");
        assert_eq!(status, ConfirmationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_email_already_confirmed() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "password123", true))));
        repository.expect_confirm_email().times(0);

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("a@x.com", TokenScope::EmailConfirm, None)
            .unwrap();

        let status = service.confirm_email(&token).await.expect("confirm failed");
        assert_eq!(status, ConfirmationStatus::AlreadyConfirmed);
    }

    #[tokio::test]
    async fn test_confirm_email_invalid_token() {
        let repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        let service = service(repository, cache, notifier, avatar_resolver);

        // Wrong scope and garbage both map to the unprocessable rejection
        let access_token = TokenCodec::new(SECRET)
            .create("a@x.com", TokenScope::Access, None)
            .unwrap();
        for token in [access_token.as_str(), "junk"] {
            let result = service.confirm_email(token).await;
            assert!(matches!(
                result.unwrap_err(),
                AuthError::InvalidConfirmationToken
            ));
        }
    }

    #[tokio::test]
    async fn test_confirm_email_unknown_subject() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, cache, notifier, avatar_resolver);

        let token = TokenCodec::new(SECRET)
            .create("ghost@x.com", TokenScope::EmailConfirm, None)
            .unwrap();

        let result = service.confirm_email(&token).await;
        assert!(matches!(result.unwrap_err(), AuthError::VerificationError));
    }

    #[tokio::test]
    async fn test_request_confirmation_resends_for_unconfirmed() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let mut notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "password123", false))));
        notifier
            .expect_send_confirmation()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, cache, notifier, avatar_resolver);

        let status = service
            .request_confirmation("a@x.com")
            .await
            .expect("request failed");
        assert_eq!(status, ConfirmationStatus::Pending);
    }

    #[tokio::test]
    async fn test_request_confirmation_already_confirmed() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(test_user("a@x.com", "password123", true))));

        let service = service(repository, cache, notifier, avatar_resolver);

        let status = service
            .request_confirmation("a@x.com")
            .await
            .expect("request failed");
        assert_eq!(status, ConfirmationStatus::AlreadyConfirmed);
    }

    #[tokio::test]
    async fn test_request_confirmation_unknown_email_is_pending() {
        let mut repository = MockTestUserRepository::new();
        let cache = MockTestUserCache::new();
        let mut notifier = MockTestNotifier::new();
        let avatar_resolver = MockTestAvatarResolver::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        notifier.expect_send_confirmation().times(0);

        let service = service(repository, cache, notifier, avatar_resolver);

        let status = service
            .request_confirmation("ghost@x.com")
            .await
            .expect("request failed");
        assert_eq!(status, ConfirmationStatus::Pending);
    }
}
