//! Authentication: JWT tokens, Argon2id passwords, request guards.
//!
//! ## Request Flow
//! ```text
//! POST /api/auth/login {username, password}
//!       │
//!       ▼
//! verify_password (Argon2id, constant-time)
//!       │
//!       ▼
//! JwtManager::generate_token → {token, user}
//!
//! Every other /api request:
//!       Authorization: Bearer <token>
//!       │
//!       ▼
//! require_auth middleware → Claims into request extensions
//!       │
//!       ▼
//! AuthUser extractor in the handler
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chit_core::{User, UserRole};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Login name, for log lines and display
    pub username: String,

    /// Access level baked into the token
    pub role: UserRole,

    /// Home outlet for role "user"; None for admins
    pub outlet_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// True for admin accounts.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Rejects non-admin callers.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Resolves the outlet filter for a read.
    ///
    /// Admins see everything and may narrow by `requested`; outlet users
    /// are always pinned to their own outlet.
    pub fn scope_filter(&self, requested: Option<String>) -> ApiResult<Option<String>> {
        if self.is_admin() {
            return Ok(requested);
        }
        match &self.outlet_id {
            Some(own) => Ok(Some(own.clone())),
            None => Err(ApiError::Forbidden(
                "Account has no outlet assigned".to_string(),
            )),
        }
    }

    /// Resolves the outlet a write lands in.
    ///
    /// Outlet users always write to their own outlet; admins must say
    /// which outlet they are acting for.
    pub fn scope_write(&self, requested: Option<String>) -> ApiResult<String> {
        if self.is_admin() {
            return requested
                .filter(|o| !o.trim().is_empty())
                .ok_or_else(|| ApiError::BadRequest("outlet_id is required".to_string()));
        }
        self.outlet_id
            .clone()
            .ok_or_else(|| ApiError::Forbidden("Account has no outlet assigned".to_string()))
    }

    /// Rejects access to a record from another outlet (admins pass).
    pub fn require_outlet(&self, record_outlet_id: &str) -> ApiResult<()> {
        if self.is_admin() || self.outlet_id.as_deref() == Some(record_outlet_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Record belongs to another outlet".to_string(),
            ))
        }
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a token for a logged-in user.
    pub fn generate_token(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            outlet_id: user.outlet_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(token_data.claims)
    }
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(hash)
}

/// Verify a password against a stored hash (constant-time).
///
/// Returns Unauthorized on mismatch, and the same error for a malformed
/// hash so the caller cannot distinguish the two.
pub fn verify_password(password: &str, password_hash: &str) -> ApiResult<()> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".to_string()))
}

// =============================================================================
// Middleware and Extractor
// =============================================================================

/// Middleware requiring a valid bearer token on the request.
///
/// On success the decoded [`Claims`] are inserted into request extensions
/// for the [`AuthUser`] extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

    let claims = state.jwt.validate_token(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extractor handing the authenticated caller's claims to a handler.
///
/// Only works behind [`require_auth`]; elsewhere it fails with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, outlet_id: Option<&str>) -> User {
        User {
            id: "u-1".to_string(),
            username: "tester".to_string(),
            password_hash: String::new(),
            role,
            outlet_id: outlet_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let token = manager
            .generate_token(&user(UserRole::User, Some("outlet-1")))
            .unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.outlet_id.as_deref(), Some("outlet-1"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("secret-a".to_string(), 3600);
        let token = manager.generate_token(&user(UserRole::Admin, None)).unwrap();

        let other = JwtManager::new("secret-b".to_string(), 3600);
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("admin123", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn test_scope_filter() {
        let manager = JwtManager::new("s".to_string(), 3600);

        let admin = manager.generate_token(&user(UserRole::Admin, None)).unwrap();
        let admin = manager.validate_token(&admin).unwrap();
        assert_eq!(
            admin.scope_filter(Some("outlet-2".into())).unwrap(),
            Some("outlet-2".to_string())
        );
        assert_eq!(admin.scope_filter(None).unwrap(), None);

        let staff = manager
            .generate_token(&user(UserRole::User, Some("outlet-1")))
            .unwrap();
        let staff = manager.validate_token(&staff).unwrap();
        // Requested filter is ignored; staff are pinned to their outlet
        assert_eq!(
            staff.scope_filter(Some("outlet-2".into())).unwrap(),
            Some("outlet-1".to_string())
        );
    }

    #[test]
    fn test_scope_write() {
        let manager = JwtManager::new("s".to_string(), 3600);

        let admin = manager.generate_token(&user(UserRole::Admin, None)).unwrap();
        let admin = manager.validate_token(&admin).unwrap();
        assert!(admin.scope_write(None).is_err());
        assert_eq!(admin.scope_write(Some("outlet-2".into())).unwrap(), "outlet-2");

        let unassigned = manager.generate_token(&user(UserRole::User, None)).unwrap();
        let unassigned = manager.validate_token(&unassigned).unwrap();
        assert!(unassigned.scope_write(None).is_err());
    }
}
