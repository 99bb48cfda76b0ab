//! Type-safe wrappers for the physical quantities a ride display shows
//!
//! All unit types serialize with 4 decimal places to keep the event
//! stream compact.

use serde::{Deserialize, Serialize};

/// Round f64 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 10000.0).round() / 10000.0)
}

/// Kilometers
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Kilometers(#[serde(serialize_with = "round4")] pub f64);

/// Kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct KilometersPerHour(#[serde(serialize_with = "round4")] pub f64);

impl KilometersPerHour {
    pub fn is_positive(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

/// Rounded like `round4`, then wrapped so 359.99996 goes out as 0.0
fn round4_heading<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    let rounded = (*val * 10000.0).round() / 10000.0;
    s.serialize_f64(Degrees::normalized(rounded).0)
}

/// Compass heading, degrees clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Degrees(#[serde(serialize_with = "round4_heading")] pub f64);

impl Degrees {
    /// Normalize into [0, 360)
    pub fn normalized(value: f64) -> Self {
        let v = value.rem_euclid(360.0);
        // rem_euclid can return 360.0 for tiny negative inputs
        Self(if v >= 360.0 { 0.0 } else { v })
    }
}

/// Percentage (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percentage(#[serde(serialize_with = "round4")] pub f64);

impl Percentage {
    /// Create a new percentage, clamping to [0.0, 1.0]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get as percentage (0-100)
    pub fn as_percent(&self) -> f64 {
        self.0 * 100.0
    }
}
