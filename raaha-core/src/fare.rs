//! Fixed-price fare estimation
//!
//! Base fare + per-km rate by vehicle class, a flat Salik toll on longer
//! trips, and 5% VAT on the subtotal. All amounts are AED.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trips longer than this cross a Salik gate
pub const SALIK_THRESHOLD_KM: f64 = 10.0;
pub const SALIK_TOLL_AED: f64 = 4.0;
pub const VAT_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Economy,
    Family,
    Business,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [
        VehicleClass::Economy,
        VehicleClass::Family,
        VehicleClass::Business,
    ];

    pub fn base_fare(&self) -> f64 {
        match self {
            VehicleClass::Economy => 10.0,
            VehicleClass::Family => 15.0,
            VehicleClass::Business => 20.0,
        }
    }

    pub fn rate_per_km(&self) -> f64 {
        match self {
            VehicleClass::Economy => 2.5,
            VehicleClass::Family => 3.0,
            VehicleClass::Business => 4.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VehicleClass::Economy => "4 seats • AC",
            VehicleClass::Family => "6 seats • Spacious",
            VehicleClass::Business => "Premium • WiFi",
        }
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" => Ok(VehicleClass::Economy),
            "family" => Ok(VehicleClass::Family),
            "business" => Ok(VehicleClass::Business),
            other => Err(format!("unknown vehicle class: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareBreakdown {
    pub vehicle: VehicleClass,
    pub distance_km: f64,
    pub base_fare: f64,
    pub distance_fare: f64,
    pub salik: f64,
    pub vat: f64,
    pub total: f64,
}

/// Headline price shown on the vehicle picker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareQuote {
    pub vehicle: VehicleClass,
    pub price: u32,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sanitize_distance(distance_km: f64) -> f64 {
    if distance_km.is_finite() {
        distance_km.max(0.0)
    } else {
        0.0
    }
}

pub fn estimate_fare(vehicle: VehicleClass, distance_km: f64) -> FareBreakdown {
    let distance_km = sanitize_distance(distance_km);

    let base_fare = vehicle.base_fare();
    let distance_fare = distance_km * vehicle.rate_per_km();
    let salik = if distance_km > SALIK_THRESHOLD_KM {
        SALIK_TOLL_AED
    } else {
        0.0
    };
    let subtotal = base_fare + distance_fare + salik;
    let vat = subtotal * VAT_RATE;

    FareBreakdown {
        vehicle,
        distance_km: round2(distance_km),
        base_fare: round2(base_fare),
        distance_fare: round2(distance_fare),
        salik: round2(salik),
        vat: round2(vat),
        total: round2(subtotal + vat),
    }
}

/// One rounded price per vehicle class (base + distance, no toll or VAT)
pub fn quote_all(distance_km: f64) -> Vec<FareQuote> {
    let distance_km = sanitize_distance(distance_km);
    VehicleClass::ALL
        .iter()
        .map(|&vehicle| FareQuote {
            vehicle,
            price: (vehicle.base_fare() + distance_km * vehicle.rate_per_km()).round() as u32,
        })
        .collect()
}
