//! Tick scheduling
//!
//! At most one tick task runs at a time. Starting a new one cancels the old
//! token first, so schedules never stack. The task ticks immediately, then
//! waits one cadence period between ticks and exits once the tracker stops
//! moving (completed, stopped or restarted elsewhere).

use crate::state::AppState;
use chrono::Utc;
use raaha_core::{Route, TrackerError};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawn the tick task, replacing any running one
pub async fn start_tick_task(state: AppState) -> JoinHandle<()> {
    let cancel_token = {
        let mut cancel = state.tick_cancel.write().await;
        if let Some(token) = cancel.take() {
            token.cancel();
        }
        let token = CancellationToken::new();
        *cancel = Some(token.clone());
        token
    };

    let tracker = state.tracker.clone();
    let cadence_changed = state.cadence_changed.clone();

    tokio::spawn(async move {
        info!("Tick task started");

        'ticks: loop {
            let outcome = {
                let mut tracker = tracker.write().await;
                // A restart may have cancelled us while we waited for the lock
                if cancel_token.is_cancelled() {
                    break;
                }
                tracker.tick(Utc::now())
            };
            if !outcome.keep_going() {
                debug!("Tick task done: {:?}", outcome);
                break;
            }

            // Re-arm the timer whenever the cadence changes mid-wait
            loop {
                // Register for the wakeup before reading the cadence so a change
                // in between still lands
                let notified = cadence_changed.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                let interval = tracker.read().await.tick_interval();
                tokio::select! {
                    _ = cancel_token.cancelled() => break 'ticks,
                    _ = &mut notified => {
                        debug!("Cadence changed, re-arming tick timer");
                        continue;
                    }
                    _ = sleep(interval) => break,
                }
            }
        }

        info!("Tick task ended");
    })
}

/// Start (or restart) a ride and schedule its ticks.
///
/// The previous task is cancelled while the tracker lock is still held, so it
/// can never tick the new route. On error nothing changes and the previous
/// schedule keeps running.
pub async fn start_ride(
    state: &AppState,
    route: Route,
    speed_kmh: Option<f64>,
) -> Result<JoinHandle<()>, TrackerError> {
    {
        let mut tracker = state.tracker.write().await;
        let speed = speed_kmh.unwrap_or(tracker.config().default_speed_kmh);
        tracker.start(route, speed)?;
        cancel_tick_task(state).await;
    }

    Ok(start_tick_task(state.clone()).await)
}

/// Cancel the running tick task, if any. Returns whether one was running.
pub async fn cancel_tick_task(state: &AppState) -> bool {
    let mut cancel = state.tick_cancel.write().await;
    match cancel.take() {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    }
}
