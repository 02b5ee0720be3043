use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use gemchat_db::DbError;
use gemchat_types::api::ErrorResponse;

/// Every way a request can fail, mapped onto the status codes and bodies
/// the browser client expects.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing Authorization header")]
    Unauthorized,

    #[error("invalid session token")]
    InvalidToken,

    #[error("signup rejected")]
    SignupFailed,

    #[error("no user with that email")]
    UserNotFound,

    #[error("wrong password")]
    InvalidPassword,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        error!("Database error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            ApiError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid Token").into_response(),
            ApiError::SignupFailed => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Email exists or Error".into(),
                }),
            )
                .into_response(),
            ApiError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found").into_response(),
            ApiError::InvalidPassword => (StatusCode::UNAUTHORIZED, "Invalid pass").into_response(),
            // Details were logged where the error was raised
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
