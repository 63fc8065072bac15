use axum::http::StatusCode;
use axum::Extension;

use super::signup::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;

pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&user).into()))
}
