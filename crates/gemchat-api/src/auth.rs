use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use gemchat_crypto::{derive_password_hash, sign_token, verify_password};
use gemchat_db::{Database, DbError};
use gemchat_types::api::{LoginRequest, LoginResponse, SignupRequest, SuccessResponse};
use gemchat_types::models::SessionClaims;

use crate::error::ApiError;
use crate::llm::GeminiClient;
use crate::run_blocking;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub llm: GeminiClient,
    /// When set, issued tokens expire this many seconds after login.
    pub token_ttl_secs: Option<i64>,
}

/// Any unusable body (missing field, `null`, not JSON) gets the same 400
/// as a duplicate email.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!("Rejected signup body: {}", rejection.body_text());
        ApiError::SignupFailed
    })?;

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::SignupFailed);
    }

    // PBKDF2 is deliberately slow, keep it off the async workers
    let password = req.password;
    let derived = run_blocking(move || derive_password_hash(&password, None))
        .await?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let user_id = Uuid::new_v4().to_string();

    let db = state.clone();
    let id = user_id.clone();
    let email = req.email.clone();
    let created = run_blocking(move || {
        db.db
            .create_user(&id, &req.username, &email, &derived.hash, &derived.salt)
    })
    .await?;

    match created {
        Ok(()) => {
            info!("Registered user {}", user_id);
            Ok(Json(SuccessResponse::ok()))
        }
        Err(DbError::EmailTaken) => Err(ApiError::SignupFailed),
        Err(e) => {
            warn!("Signup insert failed: {}", e);
            Err(ApiError::SignupFailed)
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let db = state.clone();
    let email = req.email;
    let user = run_blocking(move || db.db.get_user_by_email(&email))
        .await??
        .ok_or(ApiError::UserNotFound)?;

    let password = req.password;
    let (hash, salt) = (user.password_hash.clone(), user.salt.clone());
    let matches = run_blocking(move || verify_password(&password, &hash, &salt))
        .await?
        .map_err(|e| {
            warn!("Stored credentials for {} are corrupt: {}", user.id, e);
            ApiError::Internal(e.to_string())
        })?;

    if !matches {
        return Err(ApiError::InvalidPassword);
    }

    let claims = SessionClaims {
        id: user.id.clone(),
        email: user.email,
        exp: state
            .token_ttl_secs
            .map(|ttl| chrono::Utc::now().timestamp() + ttl),
    };

    let token = sign_token(&claims, &state.jwt_secret)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}
