//! # Package Repository
//!
//! Database operations for package templates, customer packages and the
//! service record ledger.
//!
//! ## Redemption Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Package Redemption (all-or-nothing)                    │
//! │                                                                         │
//! │  1. Read the package row                                               │
//! │  2. chit-core: validate lines, compute total, build records            │
//! │  3. BEGIN                                                              │
//! │     UPDATE customer_packages                                           │
//! │        SET remaining = remaining - :total                              │
//! │      WHERE id = :id AND remaining >= :total   ← the balance guard      │
//! │     0 rows? → ROLLBACK, InsufficientBalance                            │
//! │     INSERT service_records (one per line, shared transaction_id)       │
//! │     COMMIT                                                             │
//! │                                                                         │
//! │  Two concurrent redemptions both pass step 2 against the same read;    │
//! │  the guard in step 3 lets only balances that still cover the total     │
//! │  through, so the ledger can never go negative.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chit_core::package::{self, ServiceLine};
use chit_core::validation::validate_service_value;
use chit_core::{CustomerPackage, Money, PackageTemplate, ServiceRecord};

/// Filters for listing customer packages. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub outlet_id: Option<String>,
    pub customer_mobile: Option<String>,
}

/// Repository for package database operations.
#[derive(Debug, Clone)]
pub struct PackageRepository {
    pool: SqlitePool,
}

impl PackageRepository {
    /// Creates a new PackageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PackageRepository { pool }
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Lists all package templates, newest first.
    pub async fn list_templates(&self) -> DbResult<Vec<PackageTemplate>> {
        let templates = sqlx::query_as::<_, PackageTemplate>(
            r#"
            SELECT id, name, package_value_paise, service_value_paise, created_at
            FROM package_templates
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Gets a template by ID.
    pub async fn get_template(&self, id: &str) -> DbResult<Option<PackageTemplate>> {
        let template = sqlx::query_as::<_, PackageTemplate>(
            r#"
            SELECT id, name, package_value_paise, service_value_paise, created_at
            FROM package_templates
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Creates a package template.
    ///
    /// When `name` is None the conventional "Pay X Get Y" name is used,
    /// with the values quoted in whole rupees.
    pub async fn create_template(
        &self,
        name: Option<String>,
        package_value: Money,
        service_value: Money,
    ) -> DbResult<PackageTemplate> {
        validate_service_value(package_value).map_err(chit_core::CoreError::from)?;
        validate_service_value(service_value).map_err(chit_core::CoreError::from)?;

        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => PackageTemplate::conventional_name(package_value, service_value),
        };

        let template = PackageTemplate {
            id: Uuid::new_v4().to_string(),
            name,
            package_value_paise: package_value.paise(),
            service_value_paise: service_value.paise(),
            created_at: Utc::now(),
        };

        debug!(name = %template.name, "Creating package template");

        sqlx::query(
            r#"
            INSERT INTO package_templates
                (id, name, package_value_paise, service_value_paise, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(template.package_value_paise)
        .bind(template.service_value_paise)
        .bind(template.created_at)
        .execute(&self.pool)
        .await?;

        Ok(template)
    }

    /// Hard-deletes a template. Already-sold packages keep their ceiling
    /// and keep working.
    pub async fn delete_template(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting package template");

        let result = sqlx::query("DELETE FROM package_templates WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PackageTemplate", id));
        }

        Ok(())
    }

    // =========================================================================
    // Customer Packages
    // =========================================================================

    /// Lists customer packages newest-first, optionally filtered by outlet
    /// and customer mobile.
    pub async fn list(&self, filter: &PackageFilter) -> DbResult<Vec<CustomerPackage>> {
        let packages = sqlx::query_as::<_, CustomerPackage>(
            r#"
            SELECT id, customer_name, customer_mobile, package_template_id,
                   outlet_id, assigned_date, remaining_service_value_paise
            FROM customer_packages
            WHERE (?1 IS NULL OR outlet_id = ?1)
              AND (?2 IS NULL OR customer_mobile = ?2)
            ORDER BY assigned_date DESC
            "#,
        )
        .bind(&filter.outlet_id)
        .bind(&filter.customer_mobile)
        .fetch_all(&self.pool)
        .await?;

        Ok(packages)
    }

    /// Gets a customer package by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CustomerPackage>> {
        let package = sqlx::query_as::<_, CustomerPackage>(
            r#"
            SELECT id, customer_name, customer_mobile, package_template_id,
                   outlet_id, assigned_date, remaining_service_value_paise
            FROM customer_packages
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(package)
    }

    /// Assigns a package to a customer.
    ///
    /// The starting balance is the template's service value minus any
    /// initial services taken on day one. Rejected without writing anything
    /// when the initial services overdraw the ceiling.
    pub async fn assign(
        &self,
        template_id: &str,
        customer_name: &str,
        customer_mobile: &str,
        outlet_id: &str,
        initial: &[ServiceLine],
        now: DateTime<Utc>,
    ) -> DbResult<CustomerPackage> {
        let template = self
            .get_template(template_id)
            .await?
            .ok_or_else(|| DbError::not_found("PackageTemplate", template_id))?;

        let assignment =
            package::assign_package(&template, customer_name, customer_mobile, outlet_id, initial, now)?;

        debug!(
            customer = %assignment.package.customer_name,
            template = %template.name,
            remaining = assignment.package.remaining_service_value_paise,
            "Assigning package"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customer_packages (
                id, customer_name, customer_mobile, package_template_id,
                outlet_id, assigned_date, remaining_service_value_paise
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&assignment.package.id)
        .bind(&assignment.package.customer_name)
        .bind(&assignment.package.customer_mobile)
        .bind(&assignment.package.package_template_id)
        .bind(&assignment.package.outlet_id)
        .bind(assignment.package.assigned_date)
        .bind(assignment.package.remaining_service_value_paise)
        .execute(&mut *tx)
        .await?;

        for record in &assignment.initial_records {
            insert_record(&mut tx, record).await?;
        }

        tx.commit().await?;

        Ok(assignment.package)
    }

    /// Redeems services against a package balance.
    ///
    /// All-or-nothing: the balance decrement is a conditional UPDATE and
    /// the record inserts share its transaction. Returns the updated
    /// package and the new records.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no package with this id
    /// * `DbError::Domain` - empty or invalid service lines
    /// * `DbError::InsufficientBalance` - total exceeds the balance
    pub async fn redeem(
        &self,
        id: &str,
        lines: &[ServiceLine],
        now: DateTime<Utc>,
    ) -> DbResult<(CustomerPackage, Vec<ServiceRecord>)> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("CustomerPackage", id))?;

        // Validates lines and checks the balance as of this read.
        let redemption = package::redeem_from_package(&current, lines, now)?;
        let total =
            current.remaining_service_value_paise - redemption.new_remaining.paise();

        let mut tx = self.pool.begin().await?;

        // The guard re-checks against the live balance, so a concurrent
        // redemption that landed since our read cannot push us negative.
        let result = sqlx::query(
            r#"
            UPDATE customer_packages
            SET remaining_service_value_paise = remaining_service_value_paise - ?2
            WHERE id = ?1 AND remaining_service_value_paise >= ?2
            "#,
        )
        .bind(id)
        .bind(total)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            let live = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("CustomerPackage", id))?;
            return Err(DbError::InsufficientBalance {
                available_paise: live.remaining_service_value_paise,
                requested_paise: total,
            });
        }

        for record in &redemption.records {
            insert_record(&mut tx, record).await?;
        }

        tx.commit().await?;

        let updated = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("CustomerPackage", id))?;

        debug!(
            id = %id,
            services = redemption.records.len(),
            remaining = updated.remaining_service_value_paise,
            "Package redemption recorded"
        );

        Ok((updated, redemption.records))
    }

    /// Service records for a package, newest first.
    pub async fn history(&self, package_id: &str) -> DbResult<Vec<ServiceRecord>> {
        let records = sqlx::query_as::<_, ServiceRecord>(
            r#"
            SELECT id, customer_package_id, service_name, service_value_paise,
                   redeemed_date, transaction_id
            FROM service_records
            WHERE customer_package_id = ?1
            ORDER BY redeemed_date DESC, id
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Inserts one service record inside an open transaction.
async fn insert_record(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    record: &ServiceRecord,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO service_records (
            id, customer_package_id, service_name, service_value_paise,
            redeemed_date, transaction_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&record.id)
    .bind(&record.customer_package_id)
    .bind(&record.service_name)
    .bind(record.service_value_paise)
    .bind(record.redeemed_date)
    .bind(&record.transaction_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chit_core::CoreError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn template(db: &Database) -> PackageTemplate {
        db.packages()
            .create_template(None, Money::from_rupees(10_000), Money::from_rupees(15_000))
            .await
            .unwrap()
    }

    fn lines(values_rupees: &[i64]) -> Vec<ServiceLine> {
        values_rupees
            .iter()
            .enumerate()
            .map(|(i, v)| ServiceLine::new(format!("Service {}", i + 1), Money::from_rupees(*v)))
            .collect()
    }

    #[tokio::test]
    async fn test_template_conventional_name() {
        let db = test_db().await;
        let tpl = template(&db).await;
        assert_eq!(tpl.name, "Pay 10000 Get 15000");
    }

    #[tokio::test]
    async fn test_assign_and_fetch() {
        let db = test_db().await;
        let tpl = template(&db).await;

        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        assert_eq!(pkg.remaining_service_value_paise, 1_500_000);

        let found = db
            .packages()
            .list(&PackageFilter {
                customer_mobile: Some("9876543210".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_assign_with_initial_services_writes_ledger() {
        let db = test_db().await;
        let tpl = template(&db).await;

        let pkg = db
            .packages()
            .assign(
                &tpl.id,
                "Meera Iyer",
                "9876543210",
                "outlet-1",
                &lines(&[2000, 1500]),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(pkg.remaining_service_value(), Money::from_rupees(11_500));

        let history = db.packages().history(&pkg.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction_id, history[1].transaction_id);
    }

    #[tokio::test]
    async fn test_assign_overdraw_creates_nothing() {
        let db = test_db().await;
        let tpl = template(&db).await;

        let err = db
            .packages()
            .assign(
                &tpl.id,
                "Meera Iyer",
                "9876543210",
                "outlet-1",
                &lines(&[16_000]),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InitialServicesExceedTemplate { .. })
        ));

        let all = db.packages().list(&PackageFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_redeem_debits_and_records() {
        let db = test_db().await;
        let tpl = template(&db).await;
        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        let (updated, records) = db
            .packages()
            .redeem(&pkg.id, &lines(&[1200, 800]), Utc::now())
            .await
            .unwrap();

        assert_eq!(updated.remaining_service_value(), Money::from_rupees(13_000));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction_id, records[1].transaction_id);

        let history = db.packages().history(&pkg.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_redeem_over_balance_leaves_ledger_unchanged() {
        let db = test_db().await;
        let tpl = template(&db).await;
        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        let err = db
            .packages()
            .redeem(&pkg.id, &lines(&[16_000]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientBalance { .. })
        ));

        let live = db.packages().get_by_id(&pkg.id).await.unwrap().unwrap();
        assert_eq!(live.remaining_service_value(), Money::from_rupees(15_000));
        assert!(db.packages().history(&pkg.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_empty_rejected() {
        let db = test_db().await;
        let tpl = template(&db).await;
        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        let err = db
            .packages()
            .redeem(&pkg.id, &[], Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyRedemption)));
    }

    #[tokio::test]
    async fn test_deleted_template_keeps_packages_working() {
        let db = test_db().await;
        let tpl = template(&db).await;
        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        db.packages().delete_template(&tpl.id).await.unwrap();

        // The sold package still redeems under its assigned ceiling
        let (updated, _) = db
            .packages()
            .redeem(&pkg.id, &lines(&[1000]), Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.remaining_service_value(), Money::from_rupees(14_000));
    }

    #[tokio::test]
    async fn test_exhausted_package_rejects_further_redemption() {
        let db = test_db().await;
        let tpl = template(&db).await;
        let pkg = db
            .packages()
            .assign(&tpl.id, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .await
            .unwrap();

        let (updated, _) = db
            .packages()
            .redeem(&pkg.id, &lines(&[15_000]), Utc::now())
            .await
            .unwrap();
        assert!(updated.remaining_service_value().is_zero());

        assert!(db
            .packages()
            .redeem(&pkg.id, &lines(&[1]), Utc::now())
            .await
            .is_err());
    }
}
