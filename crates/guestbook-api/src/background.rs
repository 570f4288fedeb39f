//! Background maintenance
//!
//! Periodically sweeps abandoned media rows, expired upload slots, and
//! expired guest tokens.

use std::sync::Arc;
use std::time::Duration;

use guestbook_service::{MaintenanceService, ServiceContext};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Spawn the sweeper loop on the current runtime
pub fn spawn_sweeper(
    ctx: Arc<ServiceContext>,
    every: Duration,
    incomplete_media_max_age: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run_sweeper(ctx, every, incomplete_media_max_age))
}

/// Run maintenance on every tick, forever. Failures are logged and the
/// next tick tries again.
pub async fn run_sweeper(ctx: Arc<ServiceContext>, every: Duration, incomplete_media_max_age: Duration) {
    let max_age = match chrono::Duration::from_std(incomplete_media_max_age) {
        Ok(max_age) => max_age,
        Err(e) => {
            warn!(error = %e, "Incomplete media max age out of range, sweeper disabled");
            return;
        }
    };

    if every.is_zero() {
        warn!("Sweep interval is zero, sweeper disabled");
        return;
    }

    info!(interval_secs = every.as_secs(), "Background sweeper started");

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match MaintenanceService::new(&ctx).run_once(max_age).await {
            Ok(report) if report.is_empty() => debug!("Sweep found nothing to clean"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Sweep failed"),
        }
    }
}
