//! Navigation tunables.
//!
//! The arrival radius and fallback speeds are empirical. They are kept
//! here as defaults the host can override from JSON rather than being
//! repeated at each call site.

use serde::{Deserialize, Serialize};

use crate::geo::BoundingBox;
use crate::position::WatchOptions;
use crate::route::FallbackSpeeds;
use crate::routing::WALKING_DURATION_FACTOR;

/// Distance to the destination, in miles, that counts as arrived (~50 m).
pub const ARRIVAL_RADIUS_MILES: f64 = 0.03;

pub const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org";

/// University of Minnesota Twin Cities campus area.
pub const CAMPUS_AREA: BoundingBox = BoundingBox {
    min_lat: 44.9,
    max_lat: 45.1,
    min_lon: -93.3,
    max_lon: -93.1,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub arrival_radius_miles: f64,
    pub fallback_speeds: FallbackSpeeds,
    pub walking_duration_factor: f64,
    /// Camera zoom when a destination is selected.
    pub destination_zoom: f64,
    /// Camera zoom while following the user.
    pub tracking_zoom: f64,
    /// Destinations outside this area are logged, not rejected.
    pub service_area: Option<BoundingBox>,
    pub routing_base_url: String,
    pub watch: WatchOptions,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            arrival_radius_miles: ARRIVAL_RADIUS_MILES,
            fallback_speeds: FallbackSpeeds::default(),
            walking_duration_factor: WALKING_DURATION_FACTOR,
            destination_zoom: 17.0,
            tracking_zoom: 16.0,
            service_area: Some(CAMPUS_AREA),
            routing_base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            watch: WatchOptions::default(),
        }
    }
}

impl NavConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
