use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::inbound::http::handlers::bearer_token;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::ports::AuthServicePort;

/// Extension type carrying the authenticated user through request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware resolving the caller's identity from the bearer token.
///
/// Token verification and the cached user lookup both happen in
/// `AuthService::current_user`; any credential failure comes back as a single
/// generic 401 with a `WWW-Authenticate: Bearer` challenge, while cache or
/// database outages surface as 503.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())
        .map_err(challenge_response)?
        .to_string();

    let user = state.auth_service.current_user(&token).await.map_err(|e| {
        tracing::warn!("Bearer authentication failed: {}", e);
        challenge_response(ApiError::from(e))
    })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn challenge_response(err: ApiError) -> Response {
    let mut response = err.into_response();
    if response.status() == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
}
