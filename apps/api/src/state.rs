//! Shared application state handed to every handler.

use std::sync::Arc;

use chit_db::Database;

use crate::auth::JwtManager;

/// State shared by all routes. Cheap to clone: the pool is already
/// reference-counted and the JWT manager sits behind an Arc.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (SQLite pool plus repositories).
    pub db: Database,

    /// Token signing and validation.
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
        }
    }
}
