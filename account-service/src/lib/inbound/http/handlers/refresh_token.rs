use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::bearer_token;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::ports::AuthServicePort;

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let token = bearer_token(&headers)?;

    let access_token = state
        .auth_service
        .refresh(token)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RefreshResponseData {
            access_token,
            token_type: "bearer".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    pub token_type: String,
}
