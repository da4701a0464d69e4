//! # chit-db: Database Layer for Chit
//!
//! This crate provides database access for the Chit voucher and package
//! service. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Chit Data Flow                                   │
//! │                                                                         │
//! │  axum handler (redeem_voucher)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     chit-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (voucher.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ OutletRepo    │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ UserRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ VoucherRepo   │    │              │  │   │
//! │  │   │               │    │ PackageRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite Database (WAL)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Guarantees
//!
//! State transitions and balance decrements are conditional UPDATEs:
//! `WHERE status = 'issued'` for voucher redemption and
//! `WHERE remaining_service_value_paise >= :total` for package debits.
//! When two requests race, exactly one UPDATE matches; the other request
//! gets a typed error instead of corrupting state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chit_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("chit.db")).await?;
//! let voucher = db.vouchers().get_by_code("VC-1A2B3C4D").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::outlet::OutletRepository;
pub use repository::package::{PackageFilter, PackageRepository};
pub use repository::user::UserRepository;
pub use repository::voucher::{MonthlyStats, VoucherFilter, VoucherRepository};
