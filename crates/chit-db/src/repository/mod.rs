//! # Repository Module
//!
//! Database repository implementations for Chit.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  axum handler                                                           │
//! │       │                                                                 │
//! │       │  db.vouchers().redeem(&id, bill_no, now)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  VoucherRepository                                                     │
//! │  ├── list(filter)                                                      │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, voucher)                                            │
//! │  └── redeem(&self, id, bill_no, now)   ← conditional UPDATE            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Handlers stay thin                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`outlet::OutletRepository`] - Outlet CRUD
//! - [`user::UserRepository`] - Staff account CRUD
//! - [`voucher::VoucherRepository`] - Voucher lifecycle and the expiry sweep
//! - [`package::PackageRepository`] - Templates, packages and the service ledger

pub mod outlet;
pub mod package;
pub mod user;
pub mod voucher;
