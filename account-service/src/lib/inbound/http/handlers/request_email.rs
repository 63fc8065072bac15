use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::confirm_email::confirmation_message;
use super::confirm_email::ConfirmationResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::ports::AuthServicePort;

pub async fn request_email(
    State(state): State<AppState>,
    Json(body): Json<RequestEmailBody>,
) -> Result<ApiSuccess<ConfirmationResponseData>, ApiError> {
    let status = state
        .auth_service
        .request_confirmation(&body.email)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ConfirmationResponseData {
            message: confirmation_message(status).to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestEmailBody {
    email: String,
}
