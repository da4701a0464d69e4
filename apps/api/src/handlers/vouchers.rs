//! Voucher endpoints: issue, browse, look up, redeem.
//!
//! ## Outlet Scoping
//! Admins see every outlet and must name one when issuing. Outlet users
//! are pinned to their own outlet for every operation here, including
//! lookup results at the redemption counter.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use chit_core::{NewVoucher, Voucher, VoucherStatus, VoucherType, DEFAULT_EXPIRY_DAYS};
use chit_db::VoucherFilter;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub outlet_id: Option<String>,
    pub status: Option<VoucherStatus>,
}

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub voucher_type: VoucherType,
    /// Discount as a whole percentage, 1 to 100.
    pub discount_percent: u32,
    /// Bill the voucher is issued against.
    pub bill_no: String,
    /// Validity in days; defaults to 30.
    pub expiry_days: Option<i64>,
    /// Required for admins, ignored for outlet users.
    pub outlet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Voucher code or recipient mobile number.
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub redemption_bill_no: String,
}

/// GET /api/vouchers
pub async fn list(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Voucher>>> {
    let filter = VoucherFilter {
        outlet_id: claims.scope_filter(query.outlet_id)?,
        status: query.status,
    };
    Ok(Json(state.db.vouchers().list(&filter).await?))
}

/// POST /api/vouchers
pub async fn issue(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IssueRequest>,
) -> ApiResult<(StatusCode, Json<Voucher>)> {
    let outlet_id = claims.scope_write(req.outlet_id.clone())?;
    super::ensure_outlet(&state, &outlet_id).await?;

    let new = NewVoucher {
        recipient_name: req.recipient_name,
        recipient_mobile: req.recipient_mobile,
        voucher_type: req.voucher_type,
        // Whole percent on the wire, basis points internally
        discount_bps: req.discount_percent.saturating_mul(100),
        bill_no: req.bill_no,
        expiry_days: req.expiry_days.unwrap_or(DEFAULT_EXPIRY_DAYS),
    };

    let voucher = Voucher::issue(new, &outlet_id, Utc::now())?;
    state.db.vouchers().insert(&voucher).await?;

    info!(code = %voucher.code, outlet_id = %outlet_id, "Voucher issued");
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/vouchers/lookup?q=
///
/// Matches the printed code (case-insensitive) or the recipient mobile.
pub async fn lookup(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Vec<Voucher>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("q must not be empty".to_string()));
    }

    let mut vouchers = state.db.vouchers().lookup(q).await?;
    if !claims.is_admin() {
        let own = claims.scope_filter(None)?;
        vouchers.retain(|v| Some(v.outlet_id.as_str()) == own.as_deref());
    }

    Ok(Json(vouchers))
}

/// GET /api/vouchers/{id}
pub async fn get(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Voucher>> {
    let voucher = state
        .db
        .vouchers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Voucher not found: {}", id)))?;

    claims.require_outlet(&voucher.outlet_id)?;
    Ok(Json(voucher))
}

/// POST /api/vouchers/{id}/redeem
///
/// Single-use: the database flips the status with a conditional UPDATE,
/// so of two racing redemptions exactly one succeeds and the loser gets
/// a 409 with the voucher's current state.
pub async fn redeem(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RedeemRequest>,
) -> ApiResult<Json<Voucher>> {
    let voucher = state
        .db
        .vouchers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Voucher not found: {}", id)))?;

    claims.require_outlet(&voucher.outlet_id)?;

    let redeemed = state
        .db
        .vouchers()
        .redeem(&id, &req.redemption_bill_no, Utc::now())
        .await?;

    info!(code = %redeemed.code, bill_no = %req.redemption_bill_no, "Voucher redeemed");
    Ok(Json(redeemed))
}
