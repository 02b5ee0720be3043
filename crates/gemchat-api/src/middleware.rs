use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use gemchat_crypto::verify_token;
use gemchat_types::models::SessionClaims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Validate the Bearer token and hand its claims to the handler as an
/// `Extension<SessionClaims>`.
///
/// No header at all is 401. Anything else that fails (wrong scheme, bad
/// signature, garbage, expired) collapses into a single 403.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or(ApiError::InvalidToken)?;

    let claims: SessionClaims =
        verify_token(token, &state.jwt_secret).ok_or(ApiError::InvalidToken)?;

    if let Some(exp) = claims.exp {
        if exp <= chrono::Utc::now().timestamp() {
            return Err(ApiError::InvalidToken);
        }
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Token part of `Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim_start();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
