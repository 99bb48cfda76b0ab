//! Error taxonomy shared by the tracker and its renderers
//!
//! Nothing here is fatal: callers log these and carry on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("route needs at least 2 waypoints, got {0}")]
    InvalidRoute(usize),
    #[error("waypoint {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("speed must be a positive number of km/h, got {0}")]
    InvalidSpeed(f64),
    #[error("tracker is not tracking")]
    NotTracking,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("renderer {0} has no surface attached")]
    RendererUnavailable(String),
}
