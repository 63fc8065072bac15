use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::user::service::AuthService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::avatar::GravatarResolver;
use account_service::outbound::cache::RedisUserCache;
use account_service::outbound::email::SmtpConfirmationNotifier;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::TokenCodec;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        redis_url = %config.redis.url,
        user_cache_ttl = config.redis.user_ttl_seconds,
        http_port = config.server.http_port,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let redis_client = redis::Client::open(config.redis.url.clone())?;
    let redis_connection = ConnectionManager::new(redis_client).await?;
    tracing::info!(cache = "redis", "Cache connection established");

    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let cache = Arc::new(RedisUserCache::new(
        redis_connection,
        config.redis.user_ttl_seconds,
    ));
    let notifier = Arc::new(SmtpConfirmationNotifier::new(&config.mail)?);
    let avatar_resolver = Arc::new(GravatarResolver::new());
    let token_codec = TokenCodec::new(config.jwt.secret.as_bytes());

    let auth_service = Arc::new(AuthService::new(
        repository,
        cache,
        notifier,
        avatar_resolver,
        token_codec,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_service)).await?;

    Ok(())
}
