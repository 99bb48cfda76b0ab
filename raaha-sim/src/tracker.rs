//! Simulated position tracker
//!
//! Moves a virtual vehicle along a route one tick at a time and fans each
//! position out to the registered renderers. The tracker never owns a clock
//! or a timer: whoever schedules it passes the tick timestamp in, which keeps
//! every transition reproducible in tests.
//!
//! States: Idle -> Tracking -> Completed -> (stop) -> Idle.
//!
//! Progress is cosmetic. The cursor advances a fixed `step_size` per tick
//! regardless of elapsed time or speed; speed only feeds the ETA.

use chrono::{DateTime, Utc};
use raaha_core::{
    metrics::DriverStatus,
    units::{Degrees, KilometersPerHour},
    DerivedMetrics, GeoPoint, PositionListener, PositionUpdate, Route, TrackerConfig,
    TrackerError,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cursor values this close to a whole number snap onto it, so that
/// 1/step_size ticks land exactly on the next waypoint.
const CURSOR_SNAP_EPSILON: f64 = 1e-9;

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    Idle,
    Tracking,
    Completed,
}

/// Whether the surface consuming the updates is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Snapshot of the tracker's private state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackerState {
    pub status: TrackerStatus,
    /// Fractional index into the waypoint sequence
    pub cursor: f64,
    pub speed: KilometersPerHour,
    pub last_update: Option<DateTime<Utc>>,
}

impl TrackerState {
    fn idle() -> Self {
        Self {
            status: TrackerStatus::Idle,
            cursor: 0.0,
            speed: KilometersPerHour(0.0),
            last_update: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not tracking; nothing happened
    Skipped,
    Moved(PositionUpdate),
    /// The final waypoint was reached on this tick; no more ticks needed
    Completed,
}

impl TickOutcome {
    /// Whether the scheduler should keep ticking
    pub fn keep_going(&self) -> bool {
        matches!(self, TickOutcome::Moved(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ListenerId(u64);

// =============================================================================
// Tracker
// =============================================================================

pub struct Tracker {
    config: TrackerConfig,
    route: Option<Route>,
    state: TrackerState,
    visibility: Visibility,
    listeners: Vec<(ListenerId, Box<dyn PositionListener>)>,
    next_listener_id: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            route: None,
            state: TrackerState::idle(),
            visibility: Visibility::Visible,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // === Listeners ===

    /// Register a renderer. Listeners are notified in registration order.
    pub fn subscribe(&mut self, listener: Box<dyn PositionListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        debug!("Registered renderer {} as {:?}", listener.name(), id);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(pos) => {
                let (_, listener) = self.listeners.remove(pos);
                debug!("Unregistered renderer {}", listener.name());
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // === Commands ===

    /// Begin tracking along `route`. Restarts from the origin if a ride is
    /// already in progress.
    pub fn start(&mut self, route: Route, speed_kmh: f64) -> Result<(), TrackerError> {
        let speed = KilometersPerHour(speed_kmh);
        if !speed.is_positive() {
            let err = TrackerError::InvalidSpeed(speed_kmh);
            warn!("Ignoring start command: {}", err);
            return Err(err);
        }

        if self.state.status != TrackerStatus::Idle {
            info!("Restarting tracker from {:?}", self.state.status);
        }

        info!(
            "Tracking started: {} waypoints, {:.2} km at {} km/h",
            route.len(),
            route.total_distance_km(),
            speed_kmh
        );

        self.route = Some(route);
        self.state = TrackerState {
            status: TrackerStatus::Tracking,
            cursor: 0.0,
            speed,
            last_update: None,
        };
        Ok(())
    }

    /// Convenience over [`Tracker::start`] for raw waypoint lists
    pub fn start_waypoints(
        &mut self,
        waypoints: Vec<GeoPoint>,
        speed_kmh: f64,
    ) -> Result<(), TrackerError> {
        let route = Route::new(waypoints).inspect_err(|e| {
            warn!("Ignoring start command: {}", e);
        })?;
        self.start(route, speed_kmh)
    }

    /// Replace the route of the ride in progress and rewind to its origin.
    /// Sequences shorter than two waypoints are ignored.
    pub fn set_waypoints(&mut self, waypoints: Vec<GeoPoint>) -> Result<(), TrackerError> {
        let route = Route::new(waypoints).inspect_err(|e| {
            warn!("Ignoring new waypoints: {}", e);
        })?;

        if self.state.status == TrackerStatus::Idle {
            let err = TrackerError::NotTracking;
            warn!("Ignoring new waypoints: {}", err);
            return Err(err);
        }

        debug!("Route replaced with {} waypoints", route.len());
        self.route = Some(route);
        self.state.cursor = 0.0;
        self.state.status = TrackerStatus::Tracking;
        Ok(())
    }

    /// Return to Idle. Safe to call in any state.
    pub fn stop(&mut self) {
        if self.state.status == TrackerStatus::Idle {
            debug!("Stop requested while idle");
            return;
        }

        info!("Tracking stopped from {:?}", self.state.status);
        self.route = None;
        self.state = TrackerState::idle();
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            debug!("Surface visibility changed to {:?}", visibility);
            self.visibility = visibility;
        }
    }

    // === Tick ===

    /// Advance the simulation by one step
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.state.status != TrackerStatus::Tracking {
            debug!("Tick ignored: {}", TrackerError::NotTracking);
            return TickOutcome::Skipped;
        }

        let (position, bearing, next_cursor, finished) = {
            let Some(route) = self.route.as_ref() else {
                warn!("Tick ignored: tracking without a route");
                return TickOutcome::Skipped;
            };

            let last = route.last_index() as f64;
            let cursor = self.state.cursor;
            if cursor >= last {
                (route.destination(), 0.0, cursor, true)
            } else {
                let next = snap_cursor(cursor + self.config.effective_step_size()).min(last);
                (route.position_at(cursor), route.bearing_at(cursor), next, false)
            }
        };

        self.state.last_update = Some(now);

        if finished {
            info!("Destination reached at {:?}", position);
            self.state.status = TrackerStatus::Completed;
            self.notify_completed();
            return TickOutcome::Completed;
        }

        self.state.cursor = next_cursor;

        let update = PositionUpdate {
            position,
            bearing: Degrees::normalized(bearing),
            timestamp: now,
        };
        debug!(
            "Tick: ({:.5}, {:.5}) heading {:.1}, cursor now {:.3}",
            position.latitude, position.longitude, update.bearing.0, next_cursor
        );
        self.notify_position(&update);
        TickOutcome::Moved(update)
    }

    fn notify_position(&mut self, update: &PositionUpdate) {
        for (_, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener.on_position_update(update) {
                warn!("Renderer {} skipped position update: {}", listener.name(), e);
            }
        }
    }

    fn notify_completed(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener.on_tracking_completed() {
                warn!("Renderer {} skipped completion: {}", listener.name(), e);
            }
        }
    }

    // === Queries ===

    pub fn status(&self) -> TrackerStatus {
        self.state.status
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Cadence the scheduler should use for the next tick
    pub fn tick_interval(&self) -> Duration {
        match self.visibility {
            Visibility::Visible => self.config.active_interval(),
            Visibility::Hidden => self.config.hidden_interval(),
        }
    }

    /// Interpolated position at the cursor, or `None` when idle
    pub fn current_position(&self) -> Option<GeoPoint> {
        let route = self.route.as_ref()?;
        match self.state.status {
            TrackerStatus::Idle => None,
            TrackerStatus::Tracking => Some(route.position_at(self.state.cursor)),
            TrackerStatus::Completed => Some(route.destination()),
        }
    }

    pub fn metrics(&self) -> DerivedMetrics {
        match (self.state.status, self.route.as_ref()) {
            (TrackerStatus::Tracking, Some(route)) => {
                DerivedMetrics::in_motion(route, self.state.cursor, self.state.speed)
            }
            (TrackerStatus::Completed, Some(route)) => {
                DerivedMetrics::arrived(route, self.state.speed)
            }
            _ => DerivedMetrics::idle(),
        }
    }

    pub fn driver_status(&self) -> DriverStatus {
        match self.state.status {
            TrackerStatus::Idle => DriverStatus::Online,
            TrackerStatus::Tracking => DriverStatus::EnRoute,
            TrackerStatus::Completed => DriverStatus::Completed,
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

fn snap_cursor(cursor: f64) -> f64 {
    let nearest = cursor.round();
    if (cursor - nearest).abs() < CURSOR_SNAP_EPSILON {
        nearest
    } else {
        cursor
    }
}
