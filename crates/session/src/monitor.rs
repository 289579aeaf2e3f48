//! Recurring inactivity check.
//!
//! The guard's `tick` is pure state-machine logic; this module is the
//! scheduling shell around it, decoupled from any UI lifecycle so tests can
//! drive `tick` directly with a manual clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::guard::{ReauthGuard, TickOutcome};

/// Interval between inactivity checks.
pub const CHECK_INTERVAL: Duration = Duration::from_millis(5_000);

/// Handle to stop and join the monitor task.
#[derive(Debug)]
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Request shutdown and wait for the task to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}

/// Spawn the periodic inactivity monitor.
///
/// - `current_path` resolves where the user currently is at each check
/// - `on_expired` receives the outcome whenever a check invalidates the
///   session (it is not called for quiet checks)
pub fn spawn_monitor<P, H>(
    guard: Arc<Mutex<ReauthGuard>>,
    interval: Duration,
    current_path: P,
    mut on_expired: H,
) -> MonitorHandle
where
    P: Fn() -> String + Send + 'static,
    H: FnMut(TickOutcome) + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = guard.lock().await.tick(&current_path());
                    if matches!(outcome, TickOutcome::Expired { .. }) {
                        on_expired(outcome);
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!("inactivity monitor stopping");
                        break;
                    }
                }
            }
        }
    });

    MonitorHandle { shutdown: shutdown_tx, join }
}
