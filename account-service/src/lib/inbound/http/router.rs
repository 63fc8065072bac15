use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::confirm_email::confirm_email;
use super::handlers::get_me::get_me;
use super::handlers::login::login;
use super::handlers::refresh_token::refresh_token;
use super::handlers::request_email::request_email;
use super::handlers::signup::signup;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::service::AuthService;
use crate::outbound::avatar::GravatarResolver;
use crate::outbound::cache::RedisUserCache;
use crate::outbound::email::SmtpConfirmationNotifier;
use crate::outbound::repositories::PostgresUserRepository;

pub type Service = AuthService<
    PostgresUserRepository,
    RedisUserCache,
    SmtpConfirmationNotifier,
    GravatarResolver,
>;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<Service>,
}

pub fn create_router(auth_service: Arc<Service>) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh_token", get(refresh_token))
        .route("/api/auth/confirmed_email/:token", get(confirm_email))
        .route("/api/auth/request_email", post(request_email));

    let protected_routes = Router::new()
        .route("/api/users/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
