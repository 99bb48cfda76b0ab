//! Landmark lookup and route suppliers
//!
//! Geocoding here is a literal table of UAE landmarks, not a real service.
//! Routes are either straight lines cut into even segments or a fixed demo
//! route through downtown Dubai.

use anyhow::{Context, Result};
use raaha_core::{geo::lerp_point, GeoPoint, Route};
use serde::Serialize;
use tracing::debug;

/// Central Dubai, used when a query matches nothing
pub const FALLBACK_POINT: GeoPoint = GeoPoint::new(25.2048, 55.2708);

pub const DEFAULT_PICKUP: GeoPoint = GeoPoint::new(25.2048, 55.2708);
pub const DEFAULT_DRIVER_START: GeoPoint = GeoPoint::new(25.2010, 55.2650);
pub const DEFAULT_DESTINATION: GeoPoint = GeoPoint::new(25.1972, 55.2744);

/// Queries shorter than this get no suggestions
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

/// Place names offered while typing a pickup or destination
pub const UAE_PLACES: [&str; 23] = [
    "Dubai Mall, Dubai",
    "Burj Khalifa, Dubai",
    "Dubai International Airport (DXB)",
    "Palm Jumeirah, Dubai",
    "Dubai Marina",
    "Downtown Dubai",
    "Business Bay, Dubai",
    "Dubai Creek",
    "Dubai Festival City",
    "Ibn Battuta Mall, Dubai",
    "Abu Dhabi Mall",
    "Sheikh Zayed Grand Mosque, Abu Dhabi",
    "Abu Dhabi International Airport (AUH)",
    "Yas Island, Abu Dhabi",
    "Corniche, Abu Dhabi",
    "Al Wahda Mall, Abu Dhabi",
    "Sharjah City Centre",
    "Sharjah International Airport (SHJ)",
    "Al Qasba, Sharjah",
    "Ajman City Centre",
    "RAK Mall, Ras Al Khaimah",
    "Fujairah Mall",
    "City Centre Ajman",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmark {
    pub name: String,
    pub point: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub query: String,
    /// Name of the matched landmark, `None` when the fallback was used
    pub matched: Option<String>,
    pub point: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct LandmarkDirectory {
    landmarks: Vec<Landmark>,
    places: Vec<String>,
}

impl LandmarkDirectory {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            places: Vec::new(),
        }
    }

    pub fn with_places<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.places = places.into_iter().map(Into::into).collect();
        self
    }

    pub fn uae() -> Self {
        let table = [
            ("dubai mall", 25.1972, 55.2796),
            ("burj khalifa", 25.1972, 55.2744),
            ("palm jumeirah", 25.1124, 55.1390),
            ("dubai marina", 25.0800, 55.1400),
            ("dubai airport", 25.2532, 55.3657),
            ("abu dhabi mall", 24.4539, 54.3773),
            ("sheikh zayed mosque", 24.4129, 54.4753),
            ("yas island", 24.4845, 54.6037),
        ];
        Self::new(
            table
                .iter()
                .map(|&(name, lat, lng)| Landmark {
                    name: name.to_string(),
                    point: GeoPoint::new(lat, lng),
                })
                .collect(),
        )
        .with_places(UAE_PLACES)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Up to five place names containing the query, in list order
    pub fn suggest(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        if needle.chars().count() < MIN_SUGGEST_CHARS {
            return Vec::new();
        }
        self.places
            .iter()
            .filter(|place| place.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(String::as_str)
            .collect()
    }

    /// First landmark whose name appears in the query (case-insensitive)
    pub fn find(&self, query: &str) -> Option<&Landmark> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.landmarks.iter().find(|l| needle.contains(&l.name))
    }

    pub fn geocode(&self, query: &str) -> GeocodeResult {
        match self.find(query) {
            Some(landmark) => GeocodeResult {
                query: query.to_string(),
                matched: Some(landmark.name.clone()),
                point: landmark.point,
            },
            None => {
                debug!("No landmark matches {:?}, using central Dubai", query);
                GeocodeResult {
                    query: query.to_string(),
                    matched: None,
                    point: FALLBACK_POINT,
                }
            }
        }
    }
}

impl Default for LandmarkDirectory {
    fn default() -> Self {
        Self::uae()
    }
}

// =============================================================================
// Route suppliers
// =============================================================================

/// Produces the waypoint sequence the tracker will traverse
pub trait RouteSupplier: Send + Sync {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route>;
}

/// Evenly spaced waypoints on the straight line between two points
#[derive(Debug, Clone, Copy)]
pub struct StraightLineSupplier {
    pub segments: usize,
}

impl Default for StraightLineSupplier {
    fn default() -> Self {
        Self { segments: 10 }
    }
}

impl RouteSupplier for StraightLineSupplier {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route> {
        let segments = self.segments.max(1);
        let waypoints = (0..=segments)
            .map(|i| match i {
                0 => from,
                i if i == segments => to,
                i => lerp_point(from, to, i as f64 / segments as f64),
            })
            .collect();
        Route::new(waypoints).context("Failed to build straight-line route")
    }
}

/// Fixed waypoint list; the endpoints passed in are ignored
#[derive(Debug, Clone)]
pub struct LiteralRouteSupplier {
    waypoints: Vec<GeoPoint>,
}

impl LiteralRouteSupplier {
    pub fn new(waypoints: Vec<GeoPoint>) -> Self {
        Self { waypoints }
    }

    /// Driver approach to the pickup, then on to the destination
    pub fn downtown_dubai() -> Self {
        Self::new(vec![
            DEFAULT_DRIVER_START,
            DEFAULT_PICKUP,
            GeoPoint::new(25.2010, 55.2726),
            DEFAULT_DESTINATION,
        ])
    }
}

impl Default for LiteralRouteSupplier {
    fn default() -> Self {
        Self::downtown_dubai()
    }
}

impl RouteSupplier for LiteralRouteSupplier {
    fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Result<Route> {
        Route::new(self.waypoints.clone()).context("Literal route is unusable")
    }
}
