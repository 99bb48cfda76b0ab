//! Tracker tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Cursor advance per tick, in waypoint segments (0.1 = ten ticks per segment)
    pub step_size: f64,

    /// Tick cadence while the consuming surface is visible
    pub active_interval_ms: u64,

    /// Tick cadence while the consuming surface is hidden
    pub hidden_interval_ms: u64,

    /// Assumed vehicle speed when a start command omits one
    pub default_speed_kmh: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            active_interval_ms: 2000,
            hidden_interval_ms: 5000,
            default_speed_kmh: 30.0, // average Dubai traffic
        }
    }
}

impl TrackerConfig {
    pub fn active_interval(&self) -> Duration {
        Duration::from_millis(self.active_interval_ms)
    }

    pub fn hidden_interval(&self) -> Duration {
        Duration::from_millis(self.hidden_interval_ms)
    }

    /// Step size usable by the tracker; non-positive values fall back to the default
    pub fn effective_step_size(&self) -> f64 {
        if self.step_size.is_finite() && self.step_size > 0.0 {
            self.step_size
        } else {
            Self::default().step_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.step_size, 0.1);
        assert_eq!(config.active_interval(), Duration::from_secs(2));
        assert_eq!(config.hidden_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"step_size": 0.5}"#).unwrap();
        assert_eq!(config.step_size, 0.5);
        assert_eq!(config.active_interval_ms, 2000);
        assert_eq!(config.default_speed_kmh, 30.0);
    }

    #[test]
    fn test_effective_step_size_rejects_non_positive() {
        let config = TrackerConfig {
            step_size: 0.0,
            ..Default::default()
        };
        assert_eq!(config.effective_step_size(), 0.1);
    }
}
