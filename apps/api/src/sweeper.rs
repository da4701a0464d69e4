//! Background expiry sweep.
//!
//! Flips overdue Issued vouchers to Expired with one conditional UPDATE.
//! Runs once immediately at startup (catching vouchers that lapsed while
//! the server was down), then on a fixed interval. The sweep is
//! idempotent, so an extra run is never harmful.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use chit_db::Database;

/// Runs the sweep loop forever. Spawn as a background task.
pub async fn run(db: Database, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "Expiry sweeper started");

    loop {
        // First tick fires immediately
        interval.tick().await;

        match db.vouchers().expire_due(Utc::now()).await {
            Ok(0) => {}
            Ok(expired) => info!(expired, "Expiry sweep marked vouchers expired"),
            Err(e) => error!(error = %e, "Expiry sweep failed"),
        }
    }
}
