//! Route model: an immutable, ordered waypoint sequence
//!
//! Insertion order is traversal order. A route is replaced wholesale, never
//! edited in place. Cumulative arc length is computed once at construction
//! so remaining-distance queries are O(1).

use crate::error::TrackerError;
use crate::geo::{bearing_degrees, distance_km, lerp_point, GeoPoint};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    waypoints: Vec<GeoPoint>,
    /// cumulative[i] = planar distance from waypoints[0] to waypoints[i]
    #[serde(skip)]
    cumulative_km: Vec<f64>,
}

impl Route {
    pub fn new(waypoints: Vec<GeoPoint>) -> Result<Self, TrackerError> {
        if waypoints.len() < 2 {
            return Err(TrackerError::InvalidRoute(waypoints.len()));
        }

        if let Some((index, p)) = waypoints.iter().enumerate().find(|(_, p)| !p.is_valid()) {
            return Err(TrackerError::InvalidCoordinate {
                index,
                latitude: p.latitude,
                longitude: p.longitude,
            });
        }

        let mut cumulative_km = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        cumulative_km.push(0.0);
        for pair in waypoints.windows(2) {
            total += distance_km(pair[0], pair[1]);
            cumulative_km.push(total);
        }

        Ok(Self {
            waypoints,
            cumulative_km,
        })
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Routes always hold at least two points
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    pub fn origin(&self) -> GeoPoint {
        self.waypoints[0]
    }

    pub fn destination(&self) -> GeoPoint {
        self.waypoints[self.last_index()]
    }

    pub fn total_distance_km(&self) -> f64 {
        self.cumulative_km[self.last_index()]
    }

    /// Split a cursor into (segment index, fraction within segment).
    /// The segment index always has a successor.
    fn segment(&self, cursor: f64) -> (usize, f64) {
        let last = self.last_index() as f64;
        let cursor = if cursor.is_nan() { 0.0 } else { cursor.clamp(0.0, last) };
        let i = (cursor.floor() as usize).min(self.last_index() - 1);
        (i, cursor - i as f64)
    }

    /// Interpolated position at a fractional cursor
    pub fn position_at(&self, cursor: f64) -> GeoPoint {
        let (i, frac) = self.segment(cursor);
        if frac >= 1.0 {
            return self.waypoints[i + 1];
        }
        lerp_point(self.waypoints[i], self.waypoints[i + 1], frac)
    }

    /// Heading of the segment containing the cursor. At the last waypoint this
    /// is the heading of the final segment.
    pub fn bearing_at(&self, cursor: f64) -> f64 {
        let (i, _) = self.segment(cursor);
        bearing_degrees(self.waypoints[i], self.waypoints[i + 1])
    }

    /// Distance travelled along the route up to the cursor
    pub fn travelled_km(&self, cursor: f64) -> f64 {
        let (i, frac) = self.segment(cursor);
        let segment_len = self.cumulative_km[i + 1] - self.cumulative_km[i];
        self.cumulative_km[i] + segment_len * frac
    }

    /// Distance left from the interpolated cursor position to the destination
    pub fn remaining_km(&self, cursor: f64) -> f64 {
        (self.total_distance_km() - self.travelled_km(cursor)).max(0.0)
    }
}
