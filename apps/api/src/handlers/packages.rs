//! Package endpoints: templates, assignment, redemption, history.
//!
//! History is presented the way the counter thinks about it: one entry
//! per bill (transaction), newest first, each with its service lines and
//! a subtotal.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use chit_core::{CustomerPackage, Money, PackageTemplate, ServiceLine, ServiceRecord};
use chit_db::PackageFilter;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// Display name; defaults to "Pay X Get Y" from the values.
    pub name: Option<String>,
    pub package_value_paise: i64,
    pub service_value_paise: i64,
}

#[derive(Debug, Deserialize)]
pub struct ServiceLineRequest {
    pub name: String,
    pub value_paise: i64,
}

impl ServiceLineRequest {
    fn into_line(self) -> ServiceLine {
        ServiceLine::new(self.name, Money::from_paise(self.value_paise))
    }
}

fn into_lines(reqs: Vec<ServiceLineRequest>) -> Vec<ServiceLine> {
    reqs.into_iter().map(ServiceLineRequest::into_line).collect()
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub package_template_id: String,
    pub customer_name: String,
    pub customer_mobile: String,
    /// Required for admins, ignored for outlet users.
    pub outlet_id: Option<String>,
    /// Services taken on the day of purchase, debited immediately.
    #[serde(default)]
    pub initial_services: Vec<ServiceLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub services: Vec<ServiceLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub outlet_id: Option<String>,
    pub customer_mobile: Option<String>,
}

/// One redemption response: updated balance plus the records written.
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub package: CustomerPackage,
    pub records: Vec<ServiceRecord>,
}

/// One bill in a package's history.
#[derive(Debug, Serialize)]
pub struct HistoryBill {
    pub transaction_id: String,
    /// Short printed bill number derived from the transaction id.
    pub bill_no: String,
    pub redeemed_date: DateTime<Utc>,
    pub services: Vec<ServiceRecord>,
    pub subtotal_paise: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// GET /api/package-templates
pub async fn list_templates(
    AuthUser(_claims): AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PackageTemplate>>> {
    Ok(Json(state.db.packages().list_templates().await?))
}

/// POST /api/package-templates
pub async fn create_template(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<PackageTemplate>)> {
    claims.require_admin()?;

    let template = state
        .db
        .packages()
        .create_template(
            req.name,
            Money::from_paise(req.package_value_paise),
            Money::from_paise(req.service_value_paise),
        )
        .await?;

    info!(name = %template.name, "Package template created");
    Ok((StatusCode::CREATED, Json(template)))
}

/// DELETE /api/package-templates/{id}
///
/// Packages already sold under the template keep working.
pub async fn delete_template(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    claims.require_admin()?;

    state.db.packages().delete_template(&id).await?;
    info!(id = %id, "Package template deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Customer Packages
// =============================================================================

/// GET /api/packages
pub async fn list(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<CustomerPackage>>> {
    let filter = PackageFilter {
        outlet_id: claims.scope_filter(query.outlet_id)?,
        customer_mobile: query
            .customer_mobile
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
    };
    Ok(Json(state.db.packages().list(&filter).await?))
}

/// POST /api/packages
pub async fn assign(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<(StatusCode, Json<CustomerPackage>)> {
    let outlet_id = claims.scope_write(req.outlet_id.clone())?;
    super::ensure_outlet(&state, &outlet_id).await?;

    let initial = into_lines(req.initial_services);

    let package = state
        .db
        .packages()
        .assign(
            &req.package_template_id,
            &req.customer_name,
            &req.customer_mobile,
            &outlet_id,
            &initial,
            Utc::now(),
        )
        .await?;

    info!(
        id = %package.id,
        customer_mobile = %package.customer_mobile,
        remaining_paise = package.remaining_service_value_paise,
        "Package assigned"
    );
    Ok((StatusCode::CREATED, Json(package)))
}

/// GET /api/packages/{id}
pub async fn get(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerPackage>> {
    let package = state
        .db
        .packages()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package not found: {}", id)))?;

    claims.require_outlet(&package.outlet_id)?;
    Ok(Json(package))
}

/// POST /api/packages/{id}/redeem
///
/// Debits the batch atomically: either every line fits into the balance
/// and all records are written, or nothing changes and the caller gets a
/// 409 with the live balance.
pub async fn redeem(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RedeemRequest>,
) -> ApiResult<Json<RedeemResponse>> {
    let package = state
        .db
        .packages()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package not found: {}", id)))?;

    claims.require_outlet(&package.outlet_id)?;

    let lines = into_lines(req.services);
    let (package, records) = state.db.packages().redeem(&id, &lines, Utc::now()).await?;

    info!(
        id = %package.id,
        records = records.len(),
        remaining_paise = package.remaining_service_value_paise,
        "Package redeemed"
    );
    Ok(Json(RedeemResponse { package, records }))
}

/// GET /api/packages/{id}/history
pub async fn history(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<HistoryBill>>> {
    let package = state
        .db
        .packages()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Package not found: {}", id)))?;

    claims.require_outlet(&package.outlet_id)?;

    let records = state.db.packages().history(&id).await?;
    Ok(Json(group_by_bill(records)))
}

/// Groups an ordered record list (newest first) into bills.
///
/// Records sharing a transaction id are always adjacent in the input
/// because they share a redemption instant.
fn group_by_bill(records: Vec<ServiceRecord>) -> Vec<HistoryBill> {
    let mut bills: Vec<HistoryBill> = Vec::new();

    for record in records {
        match bills.last_mut() {
            Some(bill) if bill.transaction_id == record.transaction_id => {
                bill.subtotal_paise += record.service_value_paise;
                bill.services.push(record);
            }
            _ => {
                bills.push(HistoryBill {
                    transaction_id: record.transaction_id.clone(),
                    bill_no: ServiceRecord::bill_no_for(&record.transaction_id),
                    redeemed_date: record.redeemed_date,
                    subtotal_paise: record.service_value_paise,
                    services: vec![record],
                });
            }
        }
    }

    bills
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(txn: &str, value_paise: i64, when: DateTime<Utc>) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::new_v4().to_string(),
            customer_package_id: "pkg-1".to_string(),
            service_name: "Hair spa".to_string(),
            service_value_paise: value_paise,
            redeemed_date: when,
            transaction_id: txn.to_string(),
        }
    }

    #[test]
    fn test_group_by_bill_subtotals() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::days(1);

        let bills = group_by_bill(vec![
            record("txn-b", 50_000, now),
            record("txn-b", 30_000, now),
            record("txn-a", 100_000, earlier),
        ]);

        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].transaction_id, "txn-b");
        assert_eq!(bills[0].subtotal_paise, 80_000);
        assert_eq!(bills[0].services.len(), 2);
        assert_eq!(bills[1].subtotal_paise, 100_000);
        assert_eq!(bills[1].bill_no, "TXN-A");
    }

    #[test]
    fn test_group_by_bill_empty() {
        assert!(group_by_bill(Vec::new()).is_empty());
    }
}
