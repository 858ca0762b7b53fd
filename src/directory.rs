//! Parking directory client types.
//!
//! The backend answers every call with an envelope of the form
//! `{status: "success"|"error", data?, message?, count?}`. This module
//! holds the payload types, the envelope decoding, and the client-side
//! spot helpers that feed a destination into the navigation session.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;
use crate::geo::Coordinate;

/// Upper end of the cost slider, in dollars per hour. A filter at this
/// value means "any cost".
pub const MAX_COST_PER_HOUR: f64 = 5.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
    pub count: Option<usize>,
}

impl<T> ApiEnvelope<T> {
    fn check(&self) -> Result<(), DirectoryError> {
        if self.status == "success" {
            Ok(())
        } else {
            let message = self.message.as_deref().unwrap_or("unknown error");
            Err(DirectoryError::Rejected(message.to_string()))
        }
    }

    /// The payload of a successful response.
    pub fn into_result(self) -> Result<T, DirectoryError> {
        self.check()?;
        self.data
            .ok_or_else(|| DirectoryError::Malformed("missing data".to_string()))
    }

    /// Success or failure only, for calls whose payload is unused.
    pub fn into_unit(self) -> Result<(), DirectoryError> {
        self.check()
    }
}

/// Decode an envelope body and unwrap its payload.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, DirectoryError> {
    serde_json::from_str::<ApiEnvelope<T>>(body)?.into_result()
}

/// Decode an envelope body, ignoring any payload.
pub fn decode_unit(body: &str) -> Result<(), DirectoryError> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)?.into_unit()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub spot_id: i64,
    pub spot_name: Option<String>,
    pub street_name: Option<String>,
    pub campus_location: Option<String>,
    pub parking_type: Option<String>,
    pub cost: Option<f64>,
    pub walk_time: Option<String>,
    pub near_buildings: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: Option<bool>,
}

impl ParkingSpot {
    pub fn display_name(&self) -> &str {
        self.spot_name
            .as_deref()
            .or(self.street_name.as_deref())
            .unwrap_or("Parking Spot")
    }

    pub fn cost_label(&self) -> String {
        match self.cost {
            Some(cost) => format!("${cost:.2}/hr"),
            None => "N/A".to_string(),
        }
    }

    /// One-line label for search results, e.g. `"Lot 37 - $2.50/hr (Surface Lot)"`.
    pub fn search_label(&self) -> String {
        let cost = match self.cost {
            Some(_) => self.cost_label(),
            None => "Cost N/A".to_string(),
        };
        match &self.parking_type {
            Some(kind) => format!("{} - {cost} ({kind})", self.display_name()),
            None => format!("{} - {cost}", self.display_name()),
        }
    }

    /// Navigable location, if the spot has real coordinates.
    pub fn destination(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude?, self.longitude?).usable()
    }

    pub fn has_directions(&self) -> bool {
        self.destination().is_some()
    }
}

/// Keep only spots that can be navigated to.
pub fn only_with_directions(spots: Vec<ParkingSpot>) -> Vec<ParkingSpot> {
    spots.into_iter().filter(ParkingSpot::has_directions).collect()
}

/// Sidebar filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotFilter {
    pub campus: Option<String>,
    pub parking_type: Option<String>,
    pub max_cost: f64,
}

impl Default for SpotFilter {
    fn default() -> Self {
        Self {
            campus: None,
            parking_type: None,
            max_cost: MAX_COST_PER_HOUR,
        }
    }
}

impl SpotFilter {
    /// Query parameters for the filter endpoint. Empty selections are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(campus) = self.campus.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("campus", campus.to_string()));
        }
        if let Some(kind) = self.parking_type.as_deref().filter(|k| !k.is_empty()) {
            pairs.push(("type", kind.to_string()));
        }
        if self.max_cost < MAX_COST_PER_HOUR {
            pairs.push(("max_cost", self.max_cost.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_pic: Option<String>,
    pub major: Option<String>,
    pub grade_level: Option<String>,
    pub graduation_year: Option<i32>,
    pub housing_type: Option<String>,
    pub preferred_parking_types: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Personalized recommendations need major, grade level and housing.
    pub fn is_profile_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.major) && filled(&self.grade_level) && filled(&self.housing_type)
    }
}

/// `/api/current-user` response. Not wrapped in the usual envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
}

impl CurrentUser {
    pub fn into_user(self) -> Option<UserProfile> {
        if self.authenticated {
            self.user
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub major: String,
    pub grade_level: String,
    pub graduation_year: i32,
    pub housing_type: String,
}

/// A user-submitted spot. Always unverified until reviewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSpot {
    pub cost: f64,
    pub street_name: String,
    pub parking_type: String,
    pub campus_location: String,
    pub address: String,
    pub is_verified: bool,
}

impl NewSpot {
    pub fn new(cost: f64, street_name: &str, parking_type: &str, campus_location: &str) -> Self {
        Self {
            cost,
            street_name: street_name.to_string(),
            parking_type: parking_type.to_string(),
            campus_location: campus_location.to_string(),
            address: street_name.to_string(),
            is_verified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationQuery {
    pub selected_spot_id: i64,
    pub user_lat: f64,
    pub user_lon: f64,
}

/// Backend operations used by the page.
#[allow(async_fn_in_trait)]
pub trait ParkingDirectory {
    /// The signed-in user, or `None` when anonymous.
    async fn current_user(&self) -> Result<Option<UserProfile>, DirectoryError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), DirectoryError>;

    async fn filter_spots(&self, filter: &SpotFilter) -> Result<Vec<ParkingSpot>, DirectoryError>;

    async fn search(&self, query: &str) -> Result<Vec<ParkingSpot>, DirectoryError>;

    async fn add_spot(&self, spot: &NewSpot) -> Result<(), DirectoryError>;

    /// Fails with `DirectoryError::Unauthorized` when not signed in.
    async fn recommendations(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<ParkingSpot>, DirectoryError>;
}

/// Run a filter query, optionally dropping spots without coordinates.
pub async fn find_spots<D: ParkingDirectory>(
    directory: &D,
    filter: &SpotFilter,
    require_directions: bool,
) -> Result<Vec<ParkingSpot>, DirectoryError> {
    let spots = directory.filter_spots(filter).await?;
    debug!("Filter matched {} spots", spots.len());

    if require_directions {
        Ok(only_with_directions(spots))
    } else {
        Ok(spots)
    }
}
