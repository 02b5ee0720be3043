use axum::{Extension, Json, extract::State};
use tracing::warn;

use gemchat_types::api::{ChatRequest, ChatResponse};
use gemchat_types::models::{HistoryEntry, Role, SessionClaims};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;

/// Reply recorded and returned when the upstream model call fails.
pub const FALLBACK_REPLY: &str = "Error from AI";

pub async fn chat(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = match state.llm.generate(&req.message).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Gemini call for user {} failed: {}", claims.id, e);
            FALLBACK_REPLY.to_string()
        }
    };

    let timestamp = chrono::Utc::now().timestamp_millis();
    let entries = vec![
        HistoryEntry {
            role: Role::User,
            text: req.message,
            session_id: req.session_id.clone(),
            timestamp,
        },
        HistoryEntry {
            role: Role::Bot,
            text: reply.clone(),
            session_id: req.session_id,
            timestamp,
        },
    ];

    let db = state.clone();
    run_blocking(move || db.db.append_history(&claims.id, entries)).await??;

    Ok(Json(ChatResponse { reply }))
}
