use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::ConfirmationStatus;
use crate::inbound::http::router::AppState;
use crate::user::ports::AuthServicePort;

pub async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ApiSuccess<ConfirmationResponseData>, ApiError> {
    let status = state
        .auth_service
        .confirm_email(&token)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ConfirmationResponseData {
            message: confirmation_message(status).to_string(),
        },
    ))
}

pub(crate) fn confirmation_message(status: ConfirmationStatus) -> &'static str {
    match status {
        ConfirmationStatus::Confirmed => "Email confirmed",
        ConfirmationStatus::AlreadyConfirmed => "Your email is already confirmed",
        ConfirmationStatus::Pending => "Check your email for confirmation.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationResponseData {
    pub message: String,
}
