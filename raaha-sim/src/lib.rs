//! Simulated ride tracking for Raaha
//!
//! The tracker state machine, the stock renderers and the route suppliers
//! that feed it.

pub mod landmarks;
pub mod renderers;
pub mod tracker;
pub mod tween;

pub use landmarks::{LandmarkDirectory, LiteralRouteSupplier, RouteSupplier, StraightLineSupplier};
pub use renderers::{HeadlessRenderer, MapBounds, PinRenderer};
pub use tracker::{TickOutcome, Tracker, TrackerStatus, Visibility};
