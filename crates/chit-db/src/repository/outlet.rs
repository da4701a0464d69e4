//! # Outlet Repository
//!
//! Database operations for outlets (branch locations).
//!
//! Outlets are admin-managed and hard-deleted. Deleting an outlet
//! unassigns its users via `ON DELETE SET NULL`; vouchers and packages
//! issued there keep their historical outlet_id.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chit_core::Outlet;

/// Repository for outlet database operations.
#[derive(Debug, Clone)]
pub struct OutletRepository {
    pool: SqlitePool,
}

impl OutletRepository {
    /// Creates a new OutletRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OutletRepository { pool }
    }

    /// Lists all outlets, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Outlet>> {
        let outlets = sqlx::query_as::<_, Outlet>(
            r#"
            SELECT id, name, code, address, gstin, phone, created_at
            FROM outlets
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(outlets)
    }

    /// Gets an outlet by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Outlet>> {
        let outlet = sqlx::query_as::<_, Outlet>(
            r#"
            SELECT id, name, code, address, gstin, phone, created_at
            FROM outlets
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(outlet)
    }

    /// Creates a new outlet.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - outlet code already exists
    pub async fn create(
        &self,
        name: &str,
        code: &str,
        address: &str,
        gstin: &str,
        phone: &str,
    ) -> DbResult<Outlet> {
        let outlet = Outlet {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            code: code.trim().to_string(),
            address: address.trim().to_string(),
            gstin: gstin.trim().to_string(),
            phone: phone.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(code = %outlet.code, "Creating outlet");

        sqlx::query(
            r#"
            INSERT INTO outlets (id, name, code, address, gstin, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&outlet.id)
        .bind(&outlet.name)
        .bind(&outlet.code)
        .bind(&outlet.address)
        .bind(&outlet.gstin)
        .bind(&outlet.phone)
        .bind(outlet.created_at)
        .execute(&self.pool)
        .await?;

        Ok(outlet)
    }

    /// Updates an existing outlet.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - outlet doesn't exist
    /// * `DbError::UniqueViolation` - new code collides with another outlet
    pub async fn update(&self, outlet: &Outlet) -> DbResult<()> {
        debug!(id = %outlet.id, "Updating outlet");

        let result = sqlx::query(
            r#"
            UPDATE outlets SET
                name = ?2,
                code = ?3,
                address = ?4,
                gstin = ?5,
                phone = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&outlet.id)
        .bind(&outlet.name)
        .bind(&outlet.code)
        .bind(&outlet.address)
        .bind(&outlet.gstin)
        .bind(&outlet.phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outlet", &outlet.id));
        }

        Ok(())
    }

    /// Hard-deletes an outlet.
    ///
    /// Users assigned here are unassigned (outlet_id goes NULL) by the
    /// foreign key's ON DELETE SET NULL; nothing else cascades.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting outlet");

        let result = sqlx::query("DELETE FROM outlets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outlet", id));
        }

        Ok(())
    }

    /// Counts outlets (for diagnostics and seed checks).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outlets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_outlet() {
        let db = test_db().await;

        let outlet = db
            .outlets()
            .create("Indiranagar", "BLR-01", "100 Ft Road", "29ABCDE1234F1Z5", "08012345678")
            .await
            .unwrap();

        let fetched = db.outlets().get_by_id(&outlet.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Indiranagar");
        assert_eq!(fetched.code, "BLR-01");
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;

        db.outlets()
            .create("Indiranagar", "BLR-01", "", "", "")
            .await
            .unwrap();

        let err = db
            .outlets()
            .create("Koramangala", "BLR-01", "", "", "")
            .await
            .unwrap_err();

        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_unassigns_users() {
        let db = test_db().await;

        let outlet = db
            .outlets()
            .create("Indiranagar", "BLR-01", "", "", "")
            .await
            .unwrap();

        let user = db
            .users()
            .create(
                "front_desk",
                "$argon2id$fake",
                chit_core::UserRole::User,
                Some(outlet.id.clone()),
            )
            .await
            .unwrap();

        db.outlets().delete(&outlet.id).await.unwrap();

        let user = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(user.outlet_id, None);
    }

    #[tokio::test]
    async fn test_delete_missing_outlet() {
        let db = test_db().await;
        assert!(db.outlets().delete("no-such-id").await.is_err());
    }
}
