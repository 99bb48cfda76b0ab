//! Application state management

use crate::config::ServerConfig;
use chrono::Utc;
use raaha_core::{PositionListener, PositionUpdate, RenderError, TrackingEvent};
use raaha_sim::{LandmarkDirectory, Tracker};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify, RwLock};
use tokio_util::sync::CancellationToken;

/// Capacity of the event channel; slow stream clients skip what they miss
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single ride tracker. Only the tick task and command handlers mutate it.
    pub tracker: Arc<RwLock<Tracker>>,

    /// Broadcast channel for tracking events
    /// Multiple stream clients can subscribe to receive them
    pub events_tx: broadcast::Sender<TrackingEvent>,

    /// Cancellation token for the running tick task
    pub tick_cancel: Arc<RwLock<Option<CancellationToken>>>,

    /// Wakes the tick task so it re-reads the cadence
    pub cadence_changed: Arc<Notify>,

    pub landmarks: Arc<LandmarkDirectory>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut tracker = Tracker::new(config.tracker.clone());
        tracker.subscribe(Box::new(BroadcastRenderer {
            tx: events_tx.clone(),
        }));

        Self {
            tracker: Arc::new(RwLock::new(tracker)),
            events_tx,
            tick_cancel: Arc::new(RwLock::new(None)),
            cadence_changed: Arc::new(Notify::new()),
            landmarks: Arc::new(LandmarkDirectory::uae()),
            config: Arc::new(config),
        }
    }

    /// Subscribe to tracking events
    pub fn subscribe(&self) -> broadcast::Receiver<TrackingEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// Forwards tracker fan-out onto the broadcast channel
struct BroadcastRenderer {
    tx: broadcast::Sender<TrackingEvent>,
}

impl PositionListener for BroadcastRenderer {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn on_position_update(&mut self, update: &PositionUpdate) -> Result<(), RenderError> {
        // No receivers is fine; nobody is watching the stream
        let _ = self.tx.send(TrackingEvent::Position(*update));
        Ok(())
    }

    fn on_tracking_completed(&mut self) -> Result<(), RenderError> {
        let _ = self.tx.send(TrackingEvent::Completed {
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
