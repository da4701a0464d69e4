//! Login endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::verify_password;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Verifies credentials and returns a bearer token plus the user record.
/// Unknown username and wrong password produce the same 401 body.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let user = state
        .db
        .users()
        .get_by_username(req.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    verify_password(&req.password, &user.password_hash)?;

    let token = state.jwt.generate_token(&user)?;
    info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(json!({ "token": token, "user": user })))
}
