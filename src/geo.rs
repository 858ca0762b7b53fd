//! Geographic primitives.
//!
//! All coordinates use WGS84 (lat/lon in degrees). Distances are in
//! statute miles, matching what the host page displays.

use serde::{Deserialize, Serialize};

/// Earth radius in miles (mean).
const EARTH_RADIUS_MI: f64 = 3959.0;

/// A latitude/longitude pair in degrees.
///
/// `(0, 0)` is reserved as "absent": backend rows with missing
/// coordinates arrive zero-filled, so it is never a real location here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Finite, within WGS84 bounds, and not the `(0, 0)` placeholder.
    pub fn is_usable(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
            && !(self.lat == 0.0 && self.lon == 0.0)
    }

    /// `Some(self)` if usable, `None` otherwise.
    pub fn usable(self) -> Option<Self> {
        self.is_usable().then_some(self)
    }
}

/// Axis-aligned lat/lon box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lon..=self.max_lon).contains(&c.lon)
    }
}

/// Haversine distance between two points in miles.
///
/// Assumes both inputs are finite; validate before calling.
pub fn great_circle_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MI * h.sqrt().asin()
}
