//! # chit-core: Pure Business Logic for Chit
//!
//! This crate is the **heart** of Chit, the voucher and package redemption
//! tracker. It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! HTTP clients ──► apps/api (axum handlers, JWT auth)
//!                      │
//!                      ▼
//!              ★ chit-core (THIS CRATE) ★
//!       types • money • voucher • package • validation
//!       NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS
//!                      │
//!                      ▼
//!              chit-db (SQLite queries, migrations, repositories)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Outlet, User, Voucher, packages)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`voucher`] - The Issued → Redeemed / Expired state machine
//! - [`package`] - Package balance ledger arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chit_core::money::Money;
//!
//! // Create money from paise (never from floats!)
//! let service_value = Money::from_paise(500_000); // ₹5,000.00
//!
//! // Arithmetic is plain integer math
//! let after_facial = service_value - Money::from_paise(120_000);
//! assert_eq!(after_facial.paise(), 380_000);
//! ```

pub mod error;
pub mod money;
pub mod package;
pub mod types;
pub mod validation;
pub mod voucher;

// Re-exports for convenience: `use chit_core::Money` instead of
// `use chit_core::money::Money`.
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use package::ServiceLine;
pub use types::*;
pub use voucher::NewVoucher;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default voucher validity in days when the issuer does not choose one.
///
/// Matches the value pre-filled on the issuing form.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Maximum service lines accepted in a single assignment or redemption.
///
/// Prevents runaway bills; a salon visit never has hundreds of line items.
pub const MAX_SERVICE_LINES: usize = 50;

/// Maximum discount a voucher may carry, in basis points (10000 = 100%).
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Maximum value of a single monetary amount (template values, service
/// lines), in paise: ₹10,00,000.
///
/// Catches fat-fingered input, and keeps any [`MAX_SERVICE_LINES`]-sized
/// batch total far inside i64 range.
pub const MAX_SERVICE_VALUE_PAISE: i64 = 100_000_000;
