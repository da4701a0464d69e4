//! # User Repository
//!
//! Database operations for staff accounts.
//!
//! Password hashing happens in the API layer (argon2 is not a database
//! concern); this repository only ever sees the finished hash.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use chit_core::{User, UserRole};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists all users, sorted by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, outlet_id, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, outlet_id, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username (login path).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, outlet_id, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Creates a new user with a pre-hashed password.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - username taken
    /// * `DbError::ForeignKeyViolation` - outlet_id doesn't exist
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
        outlet_id: Option<String>,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            password_hash: password_hash.to_string(),
            role,
            outlet_id,
            created_at: Utc::now(),
        };

        debug!(username = %user.username, role = %user.role, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, outlet_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.outlet_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Updates a user's role and outlet assignment, and optionally the
    /// password hash (None leaves the password unchanged).
    pub async fn update(
        &self,
        id: &str,
        role: UserRole,
        outlet_id: Option<String>,
        password_hash: Option<String>,
    ) -> DbResult<()> {
        debug!(id = %id, "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                role = ?2,
                outlet_id = ?3,
                password_hash = COALESCE(?4, password_hash)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(&outlet_id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Hard-deletes a user account.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts users. Zero means a fresh install; the API bootstraps the
    /// initial admin account when it sees that.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
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
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_username() {
        let db = test_db().await;

        db.users()
            .create("admin", "$argon2id$fake", UserRole::Admin, None)
            .await
            .unwrap();

        let user = db.users().get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.outlet_id, None);

        assert!(db.users().get_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;

        db.users()
            .create("admin", "$argon2id$fake", UserRole::Admin, None)
            .await
            .unwrap();

        let err = db
            .users()
            .create("admin", "$argon2id$other", UserRole::User, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_outlet_rejected() {
        let db = test_db().await;

        let err = db
            .users()
            .create(
                "front_desk",
                "$argon2id$fake",
                UserRole::User,
                Some("no-such-outlet".to_string()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_none() {
        let db = test_db().await;

        let user = db
            .users()
            .create("admin", "$argon2id$original", UserRole::Admin, None)
            .await
            .unwrap();

        db.users()
            .update(&user.id, UserRole::Admin, None, None)
            .await
            .unwrap();

        let after = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(after.password_hash, "$argon2id$original");

        db.users()
            .update(&user.id, UserRole::Admin, None, Some("$argon2id$new".into()))
            .await
            .unwrap();

        let after = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(after.password_hash, "$argon2id$new");
    }

    #[tokio::test]
    async fn test_count_tracks_inserts() {
        let db = test_db().await;
        assert_eq!(db.users().count().await.unwrap(), 0);

        db.users()
            .create("admin", "$argon2id$fake", UserRole::Admin, None)
            .await
            .unwrap();

        assert_eq!(db.users().count().await.unwrap(), 1);
    }
}
