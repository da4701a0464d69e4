//! # Voucher Repository
//!
//! Database operations for the voucher lifecycle.
//!
//! ## Voucher Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Voucher Lifecycle                                  │
//! │                                                                         │
//! │  1. ISSUE                                                              │
//! │     └── insert(voucher) → status: issued                               │
//! │                                                                         │
//! │  2a. REDEEM (staff action, once)                                       │
//! │      └── redeem(id, bill_no, now)                                      │
//! │          UPDATE ... WHERE id = ? AND status = 'issued'                 │
//! │          0 rows → already redeemed/expired → typed error               │
//! │                                                                         │
//! │  2b. EXPIRE (sweeper, bulk)                                            │
//! │      └── expire_due(now)                                               │
//! │          UPDATE ... WHERE status = 'issued' AND expiry_date < now      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional `WHERE status = 'issued'` makes redemption race-safe:
//! of two concurrent redeem calls, exactly one matches the row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use chit_core::validation::validate_bill_no;
use chit_core::{Voucher, VoucherStatus};

/// Filters for listing vouchers. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    pub outlet_id: Option<String>,
    pub status: Option<VoucherStatus>,
}

/// Voucher counts for one calendar month (the home screen numbers).
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    /// Vouchers issued in the month.
    pub issued: i64,
    /// Vouchers redeemed in the month.
    pub redeemed: i64,
    /// Vouchers whose expiry fell in the month and that are now expired.
    pub expired: i64,
}

/// Repository for voucher database operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

const VOUCHER_COLUMNS: &str = r#"
    id, code, recipient_name, recipient_mobile, outlet_id, voucher_type,
    discount_bps, bill_no, issue_date, expiry_date, status,
    redeemed_date, redemption_bill_no
"#;

impl VoucherRepository {
    /// Creates a new VoucherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    /// Lists vouchers newest-first, optionally filtered by outlet and status.
    pub async fn list(&self, filter: &VoucherFilter) -> DbResult<Vec<Voucher>> {
        let sql = format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE (?1 IS NULL OR outlet_id = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY issue_date DESC
            "#
        );

        let vouchers = sqlx::query_as::<_, Voucher>(&sql)
            .bind(&filter.outlet_id)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;

        Ok(vouchers)
    }

    /// Gets a voucher by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Voucher>> {
        let sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = ?1");

        let voucher = sqlx::query_as::<_, Voucher>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(voucher)
    }

    /// Gets a voucher by its business code ("VC-XXXXXXXX").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Voucher>> {
        let sql = format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE code = ?1 COLLATE NOCASE");

        let voucher = sqlx::query_as::<_, Voucher>(&sql)
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(voucher)
    }

    /// Looks up vouchers by code or recipient mobile (the counter search).
    pub async fn lookup(&self, query: &str) -> DbResult<Vec<Voucher>> {
        let sql = format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE code = ?1 COLLATE NOCASE OR recipient_mobile = ?1
            ORDER BY issue_date DESC
            "#
        );

        let vouchers = sqlx::query_as::<_, Voucher>(&sql)
            .bind(query.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(vouchers)
    }

    /// Inserts a freshly issued voucher.
    ///
    /// Construction and validation happen in `Voucher::issue`; this only
    /// persists the result.
    pub async fn insert(&self, voucher: &Voucher) -> DbResult<()> {
        debug!(code = %voucher.code, outlet_id = %voucher.outlet_id, "Inserting voucher");

        sqlx::query(
            r#"
            INSERT INTO vouchers (
                id, code, recipient_name, recipient_mobile, outlet_id,
                voucher_type, discount_bps, bill_no, issue_date, expiry_date,
                status, redeemed_date, redemption_bill_no
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&voucher.id)
        .bind(&voucher.code)
        .bind(&voucher.recipient_name)
        .bind(&voucher.recipient_mobile)
        .bind(&voucher.outlet_id)
        .bind(voucher.voucher_type)
        .bind(voucher.discount_bps)
        .bind(&voucher.bill_no)
        .bind(voucher.issue_date)
        .bind(voucher.expiry_date)
        .bind(voucher.status)
        .bind(voucher.redeemed_date)
        .bind(&voucher.redemption_bill_no)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Redeems a voucher against a bill.
    ///
    /// The transition is a conditional UPDATE on `status = 'issued'`, so a
    /// voucher can only ever be redeemed once, even under concurrent calls.
    ///
    /// ## Errors
    /// * `DbError::Domain` - empty redemption bill number
    /// * `DbError::NotFound` - no voucher with this id
    /// * `DbError::InvalidVoucherState` - voucher already redeemed/expired
    pub async fn redeem(
        &self,
        id: &str,
        redemption_bill_no: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Voucher> {
        validate_bill_no("redemption_bill_no", redemption_bill_no)
            .map_err(chit_core::CoreError::from)?;
        let redemption_bill_no = redemption_bill_no.trim();

        debug!(id = %id, bill_no = %redemption_bill_no, "Redeeming voucher");

        let result = sqlx::query(
            r#"
            UPDATE vouchers SET
                status = 'redeemed',
                redeemed_date = ?2,
                redemption_bill_no = ?3
            WHERE id = ?1 AND status = 'issued'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(redemption_bill_no)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the voucher doesn't exist, or it left 'issued' first.
            return match self.get_by_id(id).await? {
                None => Err(DbError::not_found("Voucher", id)),
                Some(v) => Err(DbError::InvalidVoucherState {
                    code: v.code,
                    current_status: v.status,
                }),
            };
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Voucher", id))
    }

    /// Expires all issued vouchers whose expiry date has passed.
    ///
    /// Bulk conditional UPDATE; returns the number of vouchers expired.
    /// Called by the sweeper on startup and on its interval.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers SET status = 'expired'
            WHERE status = 'issued' AND expiry_date < ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Voucher counts for the calendar month containing `month_start`,
    /// optionally restricted to one outlet.
    ///
    /// The caller supplies the half-open range `[month_start, month_end)`;
    /// all timestamps in the table were written by the same encoder, so
    /// range comparisons are reliable.
    pub async fn monthly_stats(
        &self,
        month_start: DateTime<Utc>,
        month_end: DateTime<Utc>,
        outlet_id: Option<&str>,
    ) -> DbResult<MonthlyStats> {
        let issued: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM vouchers
            WHERE issue_date >= ?1 AND issue_date < ?2
              AND (?3 IS NULL OR outlet_id = ?3)
            "#,
        )
        .bind(month_start)
        .bind(month_end)
        .bind(outlet_id)
        .fetch_one(&self.pool)
        .await?;

        let redeemed: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM vouchers
            WHERE redeemed_date >= ?1 AND redeemed_date < ?2
              AND (?3 IS NULL OR outlet_id = ?3)
            "#,
        )
        .bind(month_start)
        .bind(month_end)
        .bind(outlet_id)
        .fetch_one(&self.pool)
        .await?;

        let expired: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM vouchers
            WHERE status = 'expired'
              AND expiry_date >= ?1 AND expiry_date < ?2
              AND (?3 IS NULL OR outlet_id = ?3)
            "#,
        )
        .bind(month_start)
        .bind(month_end)
        .bind(outlet_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MonthlyStats {
            issued,
            redeemed,
            expired,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chit_core::voucher::NewVoucher;
    use chit_core::VoucherType;
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_voucher(expiry_days: i64) -> NewVoucher {
        NewVoucher {
            recipient_name: "Meera Iyer".to_string(),
            recipient_mobile: "9876543210".to_string(),
            voucher_type: VoucherType::Partner,
            discount_bps: 2000,
            bill_no: "INV-100".to_string(),
            expiry_days,
        }
    }

    async fn issue(db: &Database, expiry_days: i64) -> Voucher {
        let voucher = Voucher::issue(new_voucher(expiry_days), "outlet-1", Utc::now()).unwrap();
        db.vouchers().insert(&voucher).await.unwrap();
        voucher
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let voucher = issue(&db, 30).await;

        let by_code = db
            .vouchers()
            .get_by_code(&voucher.code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.id, voucher.id);

        // Lookup by mobile finds the same voucher
        let by_mobile = db.vouchers().lookup("9876543210").await.unwrap();
        assert_eq!(by_mobile.len(), 1);
        assert_eq!(by_mobile[0].id, voucher.id);

        // Lowercased code still matches
        let by_lower = db
            .vouchers()
            .get_by_code(&voucher.code.to_lowercase())
            .await
            .unwrap();
        assert!(by_lower.is_some());
    }

    #[tokio::test]
    async fn test_redeem_once_only() {
        let db = test_db().await;
        let voucher = issue(&db, 30).await;

        let redeemed = db
            .vouchers()
            .redeem(&voucher.id, "INV-200", Utc::now())
            .await
            .unwrap();
        assert_eq!(redeemed.status, VoucherStatus::Redeemed);
        assert_eq!(redeemed.redemption_bill_no.as_deref(), Some("INV-200"));
        assert!(redeemed.redeemed_date.is_some());

        // Second redemption loses the conditional UPDATE
        let err = db
            .vouchers()
            .redeem(&voucher.id, "INV-201", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidVoucherState {
                current_status: VoucherStatus::Redeemed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_redeem_requires_bill_no() {
        let db = test_db().await;
        let voucher = issue(&db, 30).await;

        let err = db
            .vouchers()
            .redeem(&voucher.id, "  ", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));

        // Nothing changed
        let v = db.vouchers().get_by_id(&voucher.id).await.unwrap().unwrap();
        assert_eq!(v.status, VoucherStatus::Issued);
    }

    #[tokio::test]
    async fn test_redeem_missing_voucher() {
        let db = test_db().await;
        let err = db
            .vouchers()
            .redeem("no-such-id", "INV-1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_expire_due_sweeps_only_overdue() {
        let db = test_db().await;
        let overdue = issue(&db, 1).await;
        let current = issue(&db, 30).await;

        // A point in time past the first expiry but not the second
        let sweep_at = Utc::now() + Duration::days(2);
        let count = db.vouchers().expire_due(sweep_at).await.unwrap();
        assert_eq!(count, 1);

        let v = db.vouchers().get_by_id(&overdue.id).await.unwrap().unwrap();
        assert_eq!(v.status, VoucherStatus::Expired);

        let v = db.vouchers().get_by_id(&current.id).await.unwrap().unwrap();
        assert_eq!(v.status, VoucherStatus::Issued);

        // Sweep is idempotent
        let count = db.vouchers().expire_due(sweep_at).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_expired_voucher_cannot_redeem() {
        let db = test_db().await;
        let voucher = issue(&db, 1).await;

        db.vouchers()
            .expire_due(Utc::now() + Duration::days(2))
            .await
            .unwrap();

        let err = db
            .vouchers()
            .redeem(&voucher.id, "INV-300", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidVoucherState {
                current_status: VoucherStatus::Expired,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let voucher = issue(&db, 30).await;
        db.vouchers()
            .redeem(&voucher.id, "INV-400", Utc::now())
            .await
            .unwrap();
        issue(&db, 30).await;

        let all = db.vouchers().list(&VoucherFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let redeemed = db
            .vouchers()
            .list(&VoucherFilter {
                status: Some(VoucherStatus::Redeemed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(redeemed.len(), 1);

        let other_outlet = db
            .vouchers()
            .list(&VoucherFilter {
                outlet_id: Some("outlet-2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other_outlet.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_stats() {
        let db = test_db().await;
        let voucher = issue(&db, 30).await;
        db.vouchers()
            .redeem(&voucher.id, "INV-500", Utc::now())
            .await
            .unwrap();
        issue(&db, 30).await;

        let start = Utc::now() - Duration::days(1);
        let end = Utc::now() + Duration::days(1);

        let stats = db.vouchers().monthly_stats(start, end, None).await.unwrap();
        assert_eq!(stats.issued, 2);
        assert_eq!(stats.redeemed, 1);
        assert_eq!(stats.expired, 0);

        let scoped = db
            .vouchers()
            .monthly_stats(start, end, Some("outlet-2"))
            .await
            .unwrap();
        assert_eq!(scoped.issued, 0);
    }
}
