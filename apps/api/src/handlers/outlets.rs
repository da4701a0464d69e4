//! Outlet management endpoints. Admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use chit_core::Outlet;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OutletRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub phone: String,
}

/// GET /api/outlets
pub async fn list(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Outlet>>> {
    claims.require_admin()?;
    Ok(Json(state.db.outlets().list().await?))
}

/// POST /api/outlets
pub async fn create(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<OutletRequest>,
) -> ApiResult<(StatusCode, Json<Outlet>)> {
    claims.require_admin()?;

    let outlet = state
        .db
        .outlets()
        .create(&req.name, &req.code, &req.address, &req.gstin, &req.phone)
        .await?;

    info!(code = %outlet.code, "Outlet created");
    Ok((StatusCode::CREATED, Json(outlet)))
}

/// PUT /api/outlets/{id}
pub async fn update(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<OutletRequest>,
) -> ApiResult<Json<Outlet>> {
    claims.require_admin()?;

    let mut outlet = state
        .db
        .outlets()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Outlet not found: {}", id)))?;

    outlet.name = req.name;
    outlet.code = req.code;
    outlet.address = req.address;
    outlet.gstin = req.gstin;
    outlet.phone = req.phone;

    state.db.outlets().update(&outlet).await?;
    Ok(Json(outlet))
}

/// DELETE /api/outlets/{id}
///
/// Users assigned to the outlet are unassigned, not deleted. Vouchers
/// and packages keep their historical outlet id.
pub async fn delete(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    claims.require_admin()?;

    state.db.outlets().delete(&id).await?;
    info!(id = %id, "Outlet deleted");
    Ok(StatusCode::NO_CONTENT)
}
