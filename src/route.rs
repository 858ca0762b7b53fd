//! Route summaries and ETA estimation.
//!
//! A `RouteSummary` is the snapshot of the last fetched route. Between
//! fetches, live ETA is extrapolated from its average speed, or from a
//! fixed per-mode speed when no usable summary exists.

use serde::{Deserialize, Serialize};

/// How the user travels to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
}

impl TravelMode {
    /// Routing profile name understood by the routing provider.
    pub fn profile(self) -> &'static str {
        match self {
            TravelMode::Driving => "car",
            TravelMode::Walking => "foot",
        }
    }
}

/// Distance and duration of a fetched route.
///
/// Immutable; a new fetch replaces it rather than updating it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub mode: TravelMode,
}

impl RouteSummary {
    /// Average speed over the route, if both figures are positive and finite.
    pub fn miles_per_minute(&self) -> Option<f64> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.distance_miles) && valid(self.duration_minutes) {
            Some(self.distance_miles / self.duration_minutes)
        } else {
            None
        }
    }
}

/// Speeds used when no route summary is available, in miles per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSpeeds {
    pub driving: f64,
    pub walking: f64,
}

impl Default for FallbackSpeeds {
    fn default() -> Self {
        Self {
            driving: 0.4,
            walking: 0.05,
        }
    }
}

impl FallbackSpeeds {
    pub fn for_mode(&self, mode: TravelMode) -> f64 {
        match mode {
            TravelMode::Driving => self.driving,
            TravelMode::Walking => self.walking,
        }
    }
}

/// Estimate whole minutes remaining using the default fallback speeds.
pub fn estimate_eta_minutes(
    summary: Option<&RouteSummary>,
    mode: TravelMode,
    remaining_miles: f64,
) -> u32 {
    estimate_eta_minutes_with(summary, mode, remaining_miles, &FallbackSpeeds::default())
}

/// Estimate whole minutes remaining.
///
/// Returns 0 when nothing remains (or the distance is not a number) and at
/// least 1 otherwise, so an en-route user never sees "0 min".
pub fn estimate_eta_minutes_with(
    summary: Option<&RouteSummary>,
    mode: TravelMode,
    remaining_miles: f64,
    fallback: &FallbackSpeeds,
) -> u32 {
    if !remaining_miles.is_finite() || remaining_miles <= 0.0 {
        return 0;
    }

    let speed = summary
        .and_then(RouteSummary::miles_per_minute)
        .unwrap_or_else(|| fallback.for_mode(mode));

    // Float-to-int casts saturate, so a zero speed yields u32::MAX.
    (remaining_miles / speed).round().max(1.0) as u32
}

/// Format an ETA for display.
pub fn format_eta(minutes: f64) -> String {
    if !minutes.is_finite() {
        "…".to_string()
    } else if minutes <= 0.0 {
        "Arrived".to_string()
    } else if minutes < 1.0 {
        "<1 min".to_string()
    } else {
        format!("{} min", minutes.round() as i64)
    }
}
