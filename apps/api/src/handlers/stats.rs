//! Monthly voucher statistics for the dashboard.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Deserialize;

use chit_db::MonthlyStats;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Calendar month as "YYYY-MM"; defaults to the current month.
    pub month: Option<String>,
    pub outlet_id: Option<String>,
}

/// GET /api/stats/monthly
///
/// Counts vouchers issued, redeemed and expired within the month.
/// Admins may filter by outlet; outlet users always get their own.
pub async fn monthly(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<MonthlyStats>> {
    let outlet_id = claims.scope_filter(query.outlet_id)?;

    let (year, month) = match &query.month {
        Some(raw) => parse_month(raw)?,
        None => {
            let now = Utc::now();
            (now.year(), now.month())
        }
    };

    let (start, end) = month_bounds(year, month)?;

    let stats = state
        .db
        .vouchers()
        .monthly_stats(start, end, outlet_id.as_deref())
        .await?;

    Ok(Json(stats))
}

fn parse_month(raw: &str) -> ApiResult<(i32, u32)> {
    let invalid = || ApiError::BadRequest(format!("Invalid month, expected YYYY-MM: {}", raw));

    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Half-open UTC range [first instant of month, first instant of next).
fn month_bounds(year: i32, month: u32) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid month: {}-{:02}", year, month)))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid month: {}-{:02}", year, month)))?;

    Ok((start, end))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2026-08").unwrap(), (2026, 8));
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("August").is_err());
    }

    #[test]
    fn test_month_bounds_year_rollover() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }
}
