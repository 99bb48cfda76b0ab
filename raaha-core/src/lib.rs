//! Raaha Core Library
//!
//! Value types and pure algorithms behind the simulated ride tracker:
//! geometry, easing curves, the route model, derived metrics, fare
//! estimation and the renderer contract. Nothing in this crate touches a
//! clock or a rendering surface.

pub mod config;
pub mod easing;
pub mod error;
pub mod fare;
pub mod geo;
pub mod locale;
pub mod metrics;
pub mod model;
pub mod renderer;
pub mod route;
pub mod units;

pub use config::TrackerConfig;
pub use error::{RenderError, TrackerError};
pub use geo::GeoPoint;
pub use metrics::{DerivedMetrics, Eta};
pub use model::{PositionUpdate, TrackingEvent};
pub use renderer::PositionListener;
pub use route::Route;
