//! Staff account endpoints. Admin only.
//!
//! Password hashes never appear in responses: the `User` type skips the
//! hash on serialization, so returning the record directly is safe.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use chit_core::validation::{validate_password, validate_username};
use chit_core::{User, UserRole};

use crate::auth::{hash_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub outlet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: UserRole,
    pub outlet_id: Option<String>,
    /// When present, replaces the password.
    pub password: Option<String>,
}

/// GET /api/users
pub async fn list(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    claims.require_admin()?;
    Ok(Json(state.db.users().list().await?))
}

/// POST /api/users
pub async fn create(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;

    validate_username(&req.username)?;
    validate_password(&req.password)?;
    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .users()
        .create(
            req.username.trim(),
            &password_hash,
            req.role,
            req.outlet_id.clone(),
        )
        .await?;

    info!(username = %user.username, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    claims.require_admin()?;

    let password_hash = match &req.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    state
        .db
        .users()
        .update(&id, req.role, req.outlet_id.clone(), password_hash)
        .await?;

    let user = state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(user))
}

/// DELETE /api/users/{id}
///
/// An admin cannot delete their own account while logged in with it.
pub async fn delete(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    claims.require_admin()?;

    if claims.sub == id {
        return Err(ApiError::Conflict(
            "Cannot delete the account you are logged in with".to_string(),
        ));
    }

    state.db.users().delete(&id).await?;
    info!(id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
