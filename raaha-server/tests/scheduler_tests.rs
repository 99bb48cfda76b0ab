//! Integration tests for the tick scheduler
//!
//! Time is paused, so sleeps resolve instantly and cadences can be measured
//! exactly.

use raaha_core::{GeoPoint, TrackerConfig, TrackingEvent};
use raaha_server::{config::ServerConfig, scheduler, state::AppState};
use raaha_sim::{TrackerStatus, Visibility};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

fn waypoints() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(25.20, 55.27),
        GeoPoint::new(25.199, 55.272),
        GeoPoint::new(25.197, 55.2744),
    ]
}

/// State whose tracker takes `1 / step_size` ticks per segment
fn state_with_step(step_size: f64) -> AppState {
    AppState::new(ServerConfig {
        tracker: TrackerConfig {
            step_size,
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Drain everything currently buffered on the receiver
fn drain(rx: &mut broadcast::Receiver<TrackingEvent>) -> Vec<TrackingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn count_positions(events: &[TrackingEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, TrackingEvent::Position(_)))
        .count()
}

fn assert_close(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff < Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn test_visible_cadence_runs_to_completion() {
    let state = state_with_step(0.5);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();

    let started = Instant::now();
    scheduler::start_tick_task(state.clone()).await.await.unwrap();

    // Ticks at 0, 2, 4, 6 s move; the tick at 8 s completes
    assert_close(started.elapsed(), Duration::from_secs(8));

    let events = drain(&mut rx);
    assert_eq!(count_positions(&events), 4);
    assert!(matches!(events.last(), Some(TrackingEvent::Completed { .. })));
    assert_eq!(state.tracker.read().await.status(), TrackerStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_cadence_is_slower() {
    let state = state_with_step(0.5);
    {
        let mut tracker = state.tracker.write().await;
        tracker.set_visibility(Visibility::Hidden);
        tracker.start_waypoints(waypoints(), 30.0).unwrap();
    }

    let started = Instant::now();
    scheduler::start_tick_task(state.clone()).await.await.unwrap();

    assert_close(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_cadence_change_rearms_the_timer() {
    let state = state_with_step(0.1);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();

    let handle = scheduler::start_tick_task(state.clone()).await;

    // First tick is immediate
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);

    state
        .tracker
        .write()
        .await
        .set_visibility(Visibility::Hidden);
    state.cadence_changed.notify_waiters();

    // The 2 s visible tick must not fire; the next one is 5 s after the change
    sleep(Duration::from_millis(4500)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 0);

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);

    scheduler::cancel_tick_task(&state).await;
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_ticking() {
    let state = state_with_step(0.1);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();

    let handle = scheduler::start_tick_task(state.clone()).await;
    sleep(Duration::from_millis(500)).await;

    assert!(scheduler::cancel_tick_task(&state).await);
    assert!(!scheduler::cancel_tick_task(&state).await, "already cancelled");
    handle.await.unwrap();

    sleep(Duration::from_secs(30)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);
    // Cancelling the schedule doesn't end the ride
    assert_eq!(state.tracker.read().await.status(), TrackerStatus::Tracking);
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_running_task() {
    let state = state_with_step(0.1);
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();

    let first = scheduler::start_tick_task(state.clone()).await;
    let second = scheduler::start_tick_task(state.clone()).await;

    first.await.unwrap();
    assert!(!second.is_finished(), "replacement task should keep running");

    scheduler::cancel_tick_task(&state).await;
    second.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_task_exits_when_tracker_stopped() {
    let state = state_with_step(0.1);
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();

    let handle = scheduler::start_tick_task(state.clone()).await;
    sleep(Duration::from_millis(500)).await;
    state.tracker.write().await.stop();

    // Next tick is skipped and the task ends on its own
    handle.await.unwrap();
    assert_eq!(state.tracker.read().await.status(), TrackerStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_restart_never_double_ticks_the_new_route() {
    let state = state_with_step(0.1);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();
    let _old = scheduler::start_tick_task(state.clone()).await;

    // Old task ticked at 0 s and now waits for 2 s
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);

    // Queue the restart on the tracker lock ahead of the old task's next tick
    let guard = state.tracker.write().await;
    let new_route = raaha_core::Route::new(vec![
        GeoPoint::new(24.0, 54.0),
        GeoPoint::new(24.1, 54.0),
    ])
    .unwrap();
    let restart = tokio::spawn({
        let state = state.clone();
        async move { scheduler::start_ride(&state, new_route, Some(30.0)).await }
    });
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    sleep(Duration::from_millis(1200)).await;
    drop(guard);

    let new_task = restart.await.unwrap().unwrap();
    sleep(Duration::from_millis(500)).await;

    let positions: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            TrackingEvent::Position(u) => Some(u.position),
            TrackingEvent::Completed { .. } => None,
        })
        .collect();
    assert_eq!(
        positions,
        vec![GeoPoint::new(24.0, 54.0)],
        "only the new task may tick the new route"
    );
    assert!((state.tracker.read().await.state().cursor - 0.1).abs() < 1e-12);

    scheduler::cancel_tick_task(&state).await;
    new_task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_restart_keeps_current_schedule() {
    let state = state_with_step(0.1);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();
    let handle = scheduler::start_tick_task(state.clone()).await;

    let route = raaha_core::Route::new(waypoints()).unwrap();
    assert!(scheduler::start_ride(&state, route, Some(-5.0)).await.is_err());

    // The original ride keeps its 2 s cadence
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 2);

    scheduler::cancel_tick_task(&state).await;
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cadence_change_while_reading_interval_is_not_lost() {
    let state = state_with_step(0.1);
    let mut rx = state.subscribe();
    state
        .tracker
        .write()
        .await
        .start_waypoints(waypoints(), 30.0)
        .unwrap();
    let handle = scheduler::start_tick_task(state.clone()).await;
    sleep(Duration::from_millis(500)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);

    // Hide while holding the lock: the task wakes and blocks re-reading the cadence
    let mut guard = state.tracker.write().await;
    guard.set_visibility(Visibility::Hidden);
    state.cadence_changed.notify_waiters();
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    // Flip back before it gets the lock; this wakeup must still register
    guard.set_visibility(Visibility::Visible);
    state.cadence_changed.notify_waiters();
    drop(guard);

    // Visible again, so the next tick is 2 s out, not 5 s
    sleep(Duration::from_millis(2100)).await;
    assert_eq!(count_positions(&drain(&mut rx)), 1);

    scheduler::cancel_tick_task(&state).await;
    handle.await.unwrap();
}
