use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{error, info};

use crate::sync::{
    hour::{hour_start, SECONDS_PER_HOUR},
    Synchronizer,
};

/// Start of the next wall-clock hour strictly after `now`.
pub fn next_hour_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let next = hour_start(now.timestamp()) + SECONDS_PER_HOUR;
    DateTime::from_timestamp(next, 0).unwrap_or(now)
}

/// Runs the seven-day backfill for every tracked token, each on its own task.
pub fn spawn_initial_sync(synchronizer: Arc<Synchronizer>) -> Vec<JoinHandle<()>> {
    synchronizer
        .tokens()
        .symbols()
        .map(str::to_string)
        .map(|symbol| {
            let synchronizer = synchronizer.clone();
            tokio::spawn(async move {
                match synchronizer.sync_initial(&symbol).await {
                    Ok(report) => info!(
                        symbol = %symbol,
                        stored = report.stored.len(),
                        failed = report.failures.len(),
                        "initial sync finished"
                    ),
                    Err(err) => error!(symbol = %symbol, "initial sync failed: {err}"),
                }
            })
        })
        .collect()
}

/// Triggers `sync_recurring` for every tracked token on each tick, the
/// first tick landing on the next hour boundary. Never returns.
pub async fn run_recurring_sync(synchronizer: Arc<Synchronizer>, period: Duration) {
    let now = Utc::now();
    let delay = until(next_hour_boundary(now), now);

    let mut ticker = interval_at(Instant::now() + delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        first_tick_in_secs = delay.as_secs(),
        period_secs = period.as_secs(),
        "recurring token sync scheduled"
    );

    loop {
        ticker.tick().await;
        info!("running hourly token fetch");

        for symbol in synchronizer.tokens().symbols().map(str::to_string) {
            let synchronizer = synchronizer.clone();
            tokio::spawn(async move {
                if let Err(err) = synchronizer.sync_recurring(&symbol).await {
                    error!(symbol = %symbol, "recurring sync failed: {err}");
                }
            });
        }
    }
}

/// Time left until `deadline`, zero when it already passed.
pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (deadline - now).max(TimeDelta::zero()).to_std().unwrap_or(Duration::ZERO)
}
