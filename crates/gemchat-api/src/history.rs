use axum::{Extension, Json, extract::State};
use tracing::debug;

use gemchat_types::api::{DeleteHistoryRequest, SuccessResponse};
use gemchat_types::models::{HistoryEntry, SessionClaims};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;

pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let db = state.clone();
    let history = run_blocking(move || db.db.get_history(&claims.id)).await??;
    Ok(Json(history))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<DeleteHistoryRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let db = state.clone();
    let user_id = claims.id.clone();
    let removed = run_blocking(move || db.db.delete_session(&user_id, &req.session_id)).await??;
    debug!("Removed {} history entries for user {}", removed, claims.id);
    Ok(Json(SuccessResponse::ok()))
}
