//! Derived ride metrics: ETA, remaining distance, progress and driver status

use crate::route::Route;
use crate::units::{Degrees, Kilometers, KilometersPerHour, Percentage};
use serde::{Deserialize, Serialize};

/// ETA in whole minutes, rounded up.
///
/// Never reports 0 while distance remains. Returns `None` when the speed
/// cannot produce an estimate.
pub fn eta_minutes(remaining_km: f64, speed_kmh: f64) -> Option<u32> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 || !remaining_km.is_finite() {
        return None;
    }
    if remaining_km <= 0.0 {
        return Some(0);
    }

    let minutes = (remaining_km * 60.0 / speed_kmh).ceil();
    Some((minutes as u32).max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "snake_case")]
pub enum Eta {
    Minutes(u32),
    /// Reported once the destination is reached, instead of "0 min"
    Arrived,
    /// No ride in progress
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Online,
    EnRoute,
    Arrived,
    InTrip,
    Completed,
}

impl DriverStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DriverStatus::Online => "Online",
            DriverStatus::EnRoute => "On the way",
            DriverStatus::Arrived => "Arrived",
            DriverStatus::InTrip => "In trip",
            DriverStatus::Completed => "Trip completed",
        }
    }
}

/// Metrics recomputed on demand from the tracker state; never stored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub bearing: Degrees,
    pub remaining_distance: Kilometers,
    pub eta: Eta,
    pub speed: KilometersPerHour,
    /// Fraction of the route already covered
    pub progress: Percentage,
}

impl DerivedMetrics {
    pub fn idle() -> Self {
        Self {
            bearing: Degrees(0.0),
            remaining_distance: Kilometers(0.0),
            eta: Eta::Unavailable,
            speed: KilometersPerHour(0.0),
            progress: Percentage::new(0.0),
        }
    }

    pub fn arrived(route: &Route, speed: KilometersPerHour) -> Self {
        Self {
            bearing: Degrees::normalized(route.bearing_at(route.last_index() as f64)),
            remaining_distance: Kilometers(0.0),
            eta: Eta::Arrived,
            speed,
            progress: Percentage::new(1.0),
        }
    }

    /// Metrics for a ride still in motion at `cursor`. The ETA is at least
    /// one minute until the tracker reports completion.
    pub fn in_motion(route: &Route, cursor: f64, speed: KilometersPerHour) -> Self {
        let remaining = route.remaining_km(cursor);
        let total = route.total_distance_km();
        let progress = if total > 0.0 {
            1.0 - remaining / total
        } else {
            cursor / route.last_index() as f64
        };

        Self {
            bearing: Degrees::normalized(route.bearing_at(cursor)),
            remaining_distance: Kilometers(remaining),
            eta: eta_minutes(remaining, speed.0)
                .map(|m| Eta::Minutes(m.max(1)))
                .unwrap_or(Eta::Unavailable),
            speed,
            progress: Percentage::new(progress),
        }
    }
}
