//! # Chit API
//!
//! HTTP server for the voucher and package tracker.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                axum Router               │
//! │  routes ─► handlers ─► chit-db ─► SQLite │
//! │     │                                    │
//! │  auth middleware (JWT)                   │
//! └──────────────────────────────────────────┘
//!          ▲
//!          │ background task
//!   sweeper (voucher expiry)
//! ```
//!
//! The binary in `main.rs` wires config, database, admin bootstrap and
//! graceful shutdown around [`build_router`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;
