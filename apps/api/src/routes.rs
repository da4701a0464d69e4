//! Route table.
//!
//! ```text
//! /health                         GET   public
//! /api/auth/login                 POST  public
//! /api/outlets[/{id}]             CRUD  admin
//! /api/users[/{id}]               CRUD  admin
//! /api/vouchers                   GET POST
//! /api/vouchers/lookup            GET
//! /api/vouchers/{id}              GET
//! /api/vouchers/{id}/redeem       POST
//! /api/package-templates[/{id}]   GET POST DELETE(admin)
//! /api/packages                   GET POST
//! /api/packages/{id}              GET
//! /api/packages/{id}/redeem       POST
//! /api/packages/{id}/history      GET
//! /api/stats/monthly              GET
//! ```
//!
//! Everything under /api except login sits behind the bearer-token
//! middleware; admin checks happen inside the handlers.

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::handlers;
use crate::state::AppState;

/// Builds the full router over the given state.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        // Outlets (admin)
        .route(
            "/api/outlets",
            get(handlers::outlets::list).post(handlers::outlets::create),
        )
        .route(
            "/api/outlets/:id",
            put(handlers::outlets::update).delete(handlers::outlets::delete),
        )
        // Users (admin)
        .route(
            "/api/users",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route(
            "/api/users/:id",
            put(handlers::users::update).delete(handlers::users::delete),
        )
        // Vouchers
        .route(
            "/api/vouchers",
            get(handlers::vouchers::list).post(handlers::vouchers::issue),
        )
        .route("/api/vouchers/lookup", get(handlers::vouchers::lookup))
        .route("/api/vouchers/:id", get(handlers::vouchers::get))
        .route("/api/vouchers/:id/redeem", post(handlers::vouchers::redeem))
        // Package templates
        .route(
            "/api/package-templates",
            get(handlers::packages::list_templates).post(handlers::packages::create_template),
        )
        .route(
            "/api/package-templates/:id",
            delete(handlers::packages::delete_template),
        )
        // Customer packages
        .route(
            "/api/packages",
            get(handlers::packages::list).post(handlers::packages::assign),
        )
        .route("/api/packages/:id", get(handlers::packages::get))
        .route("/api/packages/:id/redeem", post(handlers::packages::redeem))
        .route("/api/packages/:id/history", get(handlers::packages::history))
        // Stats
        .route("/api/stats/monthly", get(handlers::stats::monthly))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> Json<Value> {
    let database = if state.db.health_check().await {
        "up"
    } else {
        "down"
    };
    Json(json!({ "status": "ok", "database": database }))
}
