//! HTTP request handlers, one module per resource.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub mod auth;
pub mod outlets;
pub mod packages;
pub mod stats;
pub mod users;
pub mod vouchers;

/// Writes must land in an outlet that exists right now.
///
/// Vouchers and packages carry no outlet foreign key so historical rows
/// survive outlet deletion; that makes this check the only thing standing
/// between a typo'd outlet id and an orphaned record.
pub(crate) async fn ensure_outlet(state: &AppState, outlet_id: &str) -> ApiResult<()> {
    if state.db.outlets().get_by_id(outlet_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Outlet not found: {}",
            outlet_id
        )));
    }
    Ok(())
}
