//! Eased interpolation between two positions
//!
//! A tween never reads a clock. Callers pass elapsed milliseconds, so a
//! frame loop, a test or a server-side replay can all drive it the same way.

use raaha_core::{easing::Easing, geo::lerp_point, GeoPoint};
use serde::Serialize;

/// The named animations a ride display runs, with their stock timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    CarMovement,
    MarkerDrop,
    RouteDrawing,
    ZoomTransition,
}

impl AnimationKind {
    pub fn duration_ms(&self) -> u64 {
        match self {
            AnimationKind::CarMovement => 1000,
            AnimationKind::MarkerDrop => 800,
            AnimationKind::RouteDrawing => 2000,
            AnimationKind::ZoomTransition => 1500,
        }
    }

    pub fn easing(&self) -> Easing {
        match self {
            AnimationKind::CarMovement => Easing::InOutQuad,
            AnimationKind::MarkerDrop => Easing::OutBounce,
            AnimationKind::RouteDrawing | AnimationKind::ZoomTransition => Easing::InOutCubic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: GeoPoint, to: GeoPoint, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
        }
    }

    pub fn for_kind(kind: AnimationKind, from: GeoPoint, to: GeoPoint) -> Self {
        Self::new(from, to, kind.duration_ms(), kind.easing())
    }

    /// Linear progress in [0, 1]. Zero-length tweens are finished immediately.
    pub fn progress(&self, elapsed_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f64 / self.duration_ms as f64).min(1.0)
    }

    pub fn sample(&self, elapsed_ms: u64) -> GeoPoint {
        let t = self.progress(elapsed_ms);
        if t >= 1.0 {
            return self.to;
        }
        lerp_point(self.from, self.to, self.easing.apply(t))
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}
