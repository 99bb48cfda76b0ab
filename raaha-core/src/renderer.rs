//! Renderer contract
//!
//! Renderers turn tracker output into something visible (a canvas map, DOM
//! pins, a log). They are registered on the tracker and called synchronously,
//! in registration order, on every tick.

use crate::error::RenderError;
use crate::model::PositionUpdate;

/// Trait for position-update consumers
///
/// Both callbacks default to no-ops so a renderer can ignore either one.
/// Returning `RenderError::RendererUnavailable` only skips this renderer's
/// visual side effect; the tracker state still advances.
pub trait PositionListener: Send + Sync {
    /// Short name used in log lines (e.g. "pin", "broadcast")
    fn name(&self) -> &str;

    fn on_position_update(&mut self, _update: &PositionUpdate) -> Result<(), RenderError> {
        Ok(())
    }

    fn on_tracking_completed(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
