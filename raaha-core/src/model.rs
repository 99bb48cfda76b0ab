//! Tracking events delivered to renderers and stream subscribers

use crate::geo::GeoPoint;
use crate::units::Degrees;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One simulated position sample, emitted once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub position: GeoPoint,
    pub bearing: Degrees,
    pub timestamp: DateTime<Utc>,
}

impl PositionUpdate {
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEvent {
    Position(PositionUpdate),
    Completed { timestamp: DateTime<Utc> },
}

impl TrackingEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TrackingEvent::Position(update) => update.timestamp,
            TrackingEvent::Completed { timestamp } => *timestamp,
        }
    }
}
