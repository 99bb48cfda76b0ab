//! Stock renderers
//!
//! - `PinRenderer` projects positions onto a flat map surface as percentage
//!   offsets and eases the pin between updates.
//! - `HeadlessRenderer` records every callback for tests and replays.

use crate::tween::{AnimationKind, Tween};
use raaha_core::{GeoPoint, PositionListener, PositionUpdate, RenderError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// =============================================================================
// Map projection
// =============================================================================

/// Geographic window shown by a flat map surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl Default for MapBounds {
    /// Greater Dubai
    fn default() -> Self {
        Self {
            min_latitude: 24.8,
            max_latitude: 25.4,
            min_longitude: 54.8,
            max_longitude: 55.8,
        }
    }
}

/// Pin position as percentage offsets from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinPlacement {
    pub x_pct: f64,
    pub y_pct: f64,
    pub rotation_deg: f64,
}

/// Points outside the window are pinned to its edge
pub fn project_to_map(point: GeoPoint, bearing_deg: f64, bounds: &MapBounds) -> PinPlacement {
    let lng_span = bounds.max_longitude - bounds.min_longitude;
    let lat_span = bounds.max_latitude - bounds.min_latitude;

    let x = (point.longitude - bounds.min_longitude) / lng_span * 100.0;
    // Screen y grows downward while latitude grows north
    let y = (1.0 - (point.latitude - bounds.min_latitude) / lat_span) * 100.0;

    PinPlacement {
        x_pct: x.clamp(0.0, 100.0),
        y_pct: y.clamp(0.0, 100.0),
        rotation_deg: bearing_deg,
    }
}

// =============================================================================
// Pin renderer
// =============================================================================

/// Drawing state of an attached map
#[derive(Debug, Clone, Default)]
pub struct MapSurface {
    tween: Option<Tween>,
    rotation_deg: f64,
    arrived: bool,
}

pub struct PinRenderer {
    bounds: MapBounds,
    surface: Option<MapSurface>,
}

impl PinRenderer {
    /// Renderer with no surface yet; updates are skipped until one is attached
    pub fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            surface: None,
        }
    }

    pub fn with_surface(bounds: MapBounds) -> Self {
        Self {
            bounds,
            surface: Some(MapSurface::default()),
        }
    }

    pub fn attach_surface(&mut self) {
        self.surface.get_or_insert_with(MapSurface::default);
    }

    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn has_arrived(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.arrived)
    }

    /// Where the pin is drawn `elapsed_ms` after the latest update
    pub fn placement_at(&self, elapsed_ms: u64) -> Option<PinPlacement> {
        let surface = self.surface.as_ref()?;
        let tween = surface.tween.as_ref()?;
        Some(project_to_map(
            tween.sample(elapsed_ms),
            surface.rotation_deg,
            &self.bounds,
        ))
    }

    fn surface_mut(&mut self) -> Result<&mut MapSurface, RenderError> {
        self.surface
            .as_mut()
            .ok_or_else(|| RenderError::RendererUnavailable("pin".to_string()))
    }
}

impl Default for PinRenderer {
    fn default() -> Self {
        Self::with_surface(MapBounds::default())
    }
}

impl PositionListener for PinRenderer {
    fn name(&self) -> &str {
        "pin"
    }

    fn on_position_update(&mut self, update: &PositionUpdate) -> Result<(), RenderError> {
        let surface = self.surface_mut()?;

        // First fix drops the pin in place; later ones glide from the last target
        let from = surface
            .tween
            .as_ref()
            .map(|t| t.to)
            .unwrap_or(update.position);
        surface.tween = Some(Tween::for_kind(
            AnimationKind::CarMovement,
            from,
            update.position,
        ));
        surface.rotation_deg = update.bearing.0;
        surface.arrived = false;
        Ok(())
    }

    fn on_tracking_completed(&mut self) -> Result<(), RenderError> {
        let surface = self.surface_mut()?;
        surface.arrived = true;
        debug!("Pin marked as arrived");
        Ok(())
    }
}

// =============================================================================
// Headless renderer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Position(PositionUpdate),
    Completed,
}

/// Records callbacks into a shared log. Clone the log with [`HeadlessRenderer::log`]
/// before handing the renderer to a tracker.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    log: Arc<Mutex<Vec<RecordedEvent>>>,
}

/// Shared view of a headless renderer's recorded events
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<RecordedEvent>>>);

impl EventLog {
    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        // Pushes are single calls, so a poisoned Vec is still consistent
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn positions(&self) -> Vec<PositionUpdate> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Position(u) => Some(*u),
                RecordedEvent::Completed => None,
            })
            .collect()
    }

    pub fn completions(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Completed))
            .count()
    }
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> EventLog {
        EventLog(Arc::clone(&self.log))
    }

    fn push(&self, event: RecordedEvent) {
        self.log().lock().push(event);
    }
}

impl PositionListener for HeadlessRenderer {
    fn name(&self) -> &str {
        "headless"
    }

    fn on_position_update(&mut self, update: &PositionUpdate) -> Result<(), RenderError> {
        self.push(RecordedEvent::Position(*update));
        Ok(())
    }

    fn on_tracking_completed(&mut self) -> Result<(), RenderError> {
        self.push(RecordedEvent::Completed);
        Ok(())
    }
}
