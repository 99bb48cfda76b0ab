//! Integration tests for the Tracker and its renderers

use chrono::{Duration, TimeZone, Utc};
use raaha_core::{metrics::Eta, GeoPoint, PositionListener, RenderError, TrackerConfig};
use raaha_sim::renderers::RecordedEvent;
use raaha_sim::{
    HeadlessRenderer, LiteralRouteSupplier, MapBounds, PinRenderer, RouteSupplier,
    StraightLineSupplier, TickOutcome, Tracker, TrackerStatus,
};
use std::sync::{Arc, Mutex};

fn dubai_waypoints() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(25.20, 55.27),
        GeoPoint::new(25.199, 55.272),
        GeoPoint::new(25.197, 55.2744),
    ]
}

/// Appends its name to a shared call log so ordering across listeners is visible
struct OrderRecorder {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl PositionListener for OrderRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_position_update(
        &mut self,
        _update: &raaha_core::PositionUpdate,
    ) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(self.name.clone());
        Ok(())
    }
}

#[test]
fn test_every_tick_emits_one_update_until_completion() {
    let mut tracker = Tracker::new(TrackerConfig {
        step_size: 0.5,
        ..Default::default()
    });
    let renderer = HeadlessRenderer::new();
    let log = renderer.log();
    tracker.subscribe(Box::new(renderer));

    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();

    let mut ticks = 0;
    while tracker.tick(Utc::now()).keep_going() {
        ticks += 1;
        assert_eq!(log.positions().len(), ticks, "one update per tick");
    }

    assert_eq!(ticks, 4);
    assert_eq!(log.completions(), 1);
    assert_eq!(log.events().last(), Some(&RecordedEvent::Completed));

    // No further notifications once completed
    tracker.tick(Utc::now());
    tracker.tick(Utc::now());
    assert_eq!(log.len(), 5);
}

#[test]
fn test_cursor_is_monotonic() {
    let mut tracker = Tracker::default();
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();

    let mut previous = tracker.state().cursor;
    while tracker.tick(Utc::now()).keep_going() {
        let cursor = tracker.state().cursor;
        assert!(cursor >= previous, "cursor went backwards: {} -> {}", previous, cursor);
        assert!(cursor <= 2.0, "cursor overshot the last waypoint: {}", cursor);
        previous = cursor;
    }
    assert_eq!(tracker.status(), TrackerStatus::Completed);
}

#[test]
fn test_remaining_distance_shrinks_and_eta_counts_down() {
    let mut tracker = Tracker::default();
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();

    let mut previous = tracker.metrics().remaining_distance.0;
    for _ in 0..15 {
        tracker.tick(Utc::now());
        let metrics = tracker.metrics();
        assert!(metrics.remaining_distance.0 <= previous);
        assert!(matches!(metrics.eta, Eta::Minutes(m) if m >= 1));
        previous = metrics.remaining_distance.0;
    }
}

#[test]
fn test_timestamps_come_from_the_caller() {
    let mut tracker = Tracker::default();
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();

    let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let now = t0 + Duration::milliseconds(2000);
    match tracker.tick(now) {
        TickOutcome::Moved(update) => {
            assert_eq!(update.timestamp, now);
            assert_eq!(update.timestamp_ms(), now.timestamp_millis());
        }
        other => panic!("expected Moved, got {:?}", other),
    }
    assert_eq!(tracker.state().last_update, Some(now));
}

#[test]
fn test_listeners_notified_in_registration_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut tracker = Tracker::default();
    for name in ["first", "second", "third"] {
        tracker.subscribe(Box::new(OrderRecorder {
            name: name.to_string(),
            calls: Arc::clone(&calls),
        }));
    }

    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    tracker.tick(Utc::now());

    assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_unsubscribed_listener_stops_receiving() {
    let mut tracker = Tracker::default();
    let renderer = HeadlessRenderer::new();
    let log = renderer.log();
    let id = tracker.subscribe(Box::new(renderer));

    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    tracker.tick(Utc::now());
    assert!(tracker.unsubscribe(id));
    assert!(!tracker.unsubscribe(id), "second unsubscribe should be a no-op");
    tracker.tick(Utc::now());

    assert_eq!(log.len(), 1);
    assert_eq!(tracker.listener_count(), 0);
}

#[test]
fn test_missing_surface_does_not_stall_the_tracker() {
    let mut tracker = Tracker::default();
    tracker.subscribe(Box::new(PinRenderer::new(MapBounds::default())));
    let renderer = HeadlessRenderer::new();
    let log = renderer.log();
    tracker.subscribe(Box::new(renderer));

    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    assert!(tracker.tick(Utc::now()).keep_going());
    assert!(tracker.tick(Utc::now()).keep_going());

    assert!(tracker.state().cursor > 0.1);
    assert_eq!(log.len(), 2, "later renderers still run after an unavailable one");
}

#[test]
fn test_restart_rewinds_to_origin() {
    let mut tracker = Tracker::default();
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    for _ in 0..5 {
        tracker.tick(Utc::now());
    }

    tracker.start_waypoints(dubai_waypoints(), 45.0).unwrap();
    assert_eq!(tracker.state().cursor, 0.0);
    assert_eq!(tracker.state().speed.0, 45.0);
    assert_eq!(tracker.current_position(), Some(dubai_waypoints()[0]));
}

#[test]
fn test_failed_restart_keeps_ride_in_progress() {
    let mut tracker = Tracker::default();
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    tracker.tick(Utc::now());
    let before = tracker.state();

    assert!(tracker.start_waypoints(vec![], 30.0).is_err());
    assert_eq!(tracker.state(), before);
}

#[test]
fn test_stop_after_completion_returns_to_idle() {
    let mut tracker = Tracker::new(TrackerConfig {
        step_size: 1.0,
        ..Default::default()
    });
    tracker.start_waypoints(dubai_waypoints(), 30.0).unwrap();
    while tracker.tick(Utc::now()).keep_going() {}

    assert_eq!(tracker.status(), TrackerStatus::Completed);
    tracker.stop();
    assert_eq!(tracker.status(), TrackerStatus::Idle);
    assert_eq!(tracker.current_position(), None);
    assert_eq!(tracker.metrics().eta, Eta::Unavailable);
}

#[test]
fn test_supplied_routes_drive_the_tracker() {
    let from = GeoPoint::new(25.2048, 55.2708);
    let to = GeoPoint::new(25.1972, 55.2744);

    let mut tracker = Tracker::new(TrackerConfig {
        step_size: 1.0,
        ..Default::default()
    });
    let route = StraightLineSupplier { segments: 3 }.route(from, to).unwrap();
    tracker.start(route, 30.0).unwrap();

    let mut moves = 0;
    while tracker.tick(Utc::now()).keep_going() {
        moves += 1;
    }
    assert_eq!(moves, 3);
    assert_eq!(tracker.current_position(), Some(to));

    let literal = LiteralRouteSupplier::default().route(from, to).unwrap();
    tracker.start(literal, 30.0).unwrap();
    assert_eq!(tracker.status(), TrackerStatus::Tracking);
}
