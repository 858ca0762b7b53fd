//! Route queries against an OSRM-compatible routing service.
//!
//! The transport is abstracted behind `RoutingProvider` so the host can
//! use its own fetch implementation. `RoutingClient` builds the request
//! path, decodes the response and converts it to miles and minutes.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::NavConfig;
use crate::error::{NavError, RoutingError};
use crate::geo::Coordinate;
use crate::position::{PositionError, PositionSource};
use crate::route::{RouteSummary, TravelMode};

const METERS_PER_MILE: f64 = 1609.34;

/// Walking estimates from the road network are too optimistic; footpaths
/// are rarely direct.
pub const WALKING_DURATION_FACTOR: f64 = 1.4;

/// GeoJSON LineString geometry of a route, `[lon, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    pub fn line_string(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "LineString".to_string(),
            coordinates,
        }
    }
}

/// A normalized route returned by `RoutingClient::fetch_route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub geometry: RouteGeometry,
}

impl Route {
    pub fn summary(&self, mode: TravelMode) -> RouteSummary {
        RouteSummary {
            distance_miles: self.distance_miles,
            duration_minutes: self.duration_minutes,
            mode,
        }
    }
}

/// Transport for routing queries.
///
/// `get` receives a path such as `/route/v1/car/...` and returns the raw
/// response body. Transport failures map to `RoutingError::NetworkFailure`.
#[allow(async_fn_in_trait)]
pub trait RoutingProvider {
    async fn get(&self, path: &str) -> Result<String, RoutingError>;
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: RouteGeometry,
}

/// Build the OSRM route path for a query.
pub fn route_path(origin: &Coordinate, destination: &Coordinate, mode: TravelMode) -> String {
    format!(
        "/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
        mode.profile(),
        origin.lon,
        origin.lat,
        destination.lon,
        destination.lat
    )
}

/// Ticket for a route fetch issued by the navigation session.
///
/// Tokens increase monotonically per session; only the newest ticket's
/// result is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub token: u64,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

/// Completed route fetch, handed back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFetch {
    pub request: RouteRequest,
    pub result: Result<Route, NavError>,
}

/// Queries a routing provider and normalizes its answers.
pub struct RoutingClient<R> {
    provider: R,
    walking_duration_factor: f64,
}

impl<R: RoutingProvider> RoutingClient<R> {
    pub fn new(provider: R) -> Self {
        Self {
            provider,
            walking_duration_factor: WALKING_DURATION_FACTOR,
        }
    }

    pub fn from_config(provider: R, config: &NavConfig) -> Self {
        Self {
            provider,
            walking_duration_factor: config.walking_duration_factor,
        }
    }

    pub fn provider(&self) -> &R {
        &self.provider
    }

    /// Fetch a route from `origin` to `destination`.
    pub async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Route, RoutingError> {
        if !destination.is_finite() {
            return Err(RoutingError::InvalidDestination);
        }

        let path = route_path(&origin, &destination, mode);
        debug!("Requesting route {path}");

        let body = self.provider.get(&path).await?;
        self.decode(&body, mode)
    }

    /// Resolve a session ticket, using the user's current position as origin.
    pub async fn fetch_for<P: PositionSource>(
        &self,
        positions: &P,
        request: RouteRequest,
    ) -> RouteFetch {
        let result = match positions.current_position().await {
            Ok(origin) => match origin.usable() {
                Some(origin) => self
                    .fetch_route(origin, request.destination, request.mode)
                    .await
                    .map_err(NavError::from),
                None => {
                    warn!("Position fix is not a usable origin");
                    Err(PositionError::Unavailable.into())
                }
            },
            Err(e) => {
                warn!("Cannot route without a position fix: {e}");
                Err(e.into())
            }
        };

        RouteFetch { request, result }
    }

    fn decode(&self, body: &str, mode: TravelMode) -> Result<Route, RoutingError> {
        let response: OsrmResponse = serde_json::from_str(body)
            .map_err(|e| RoutingError::NetworkFailure(format!("malformed response: {e}")))?;

        if response.code != "Ok" {
            debug!("Routing service answered {}", response.code);
            return Err(RoutingError::NoRoute);
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute)?;

        let mut duration_minutes = route.duration / 60.0;
        if mode == TravelMode::Walking {
            duration_minutes *= self.walking_duration_factor;
        }

        Ok(Route {
            distance_miles: route.distance / METERS_PER_MILE,
            duration_minutes,
            geometry: route.geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{osrm_body, FakeGps, FakeRouter};
    use futures::executor::block_on;

    fn pt(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn path_uses_lon_lat_order_and_profile() {
        let path = route_path(&pt(44.97, -93.23), &pt(44.98, -93.24), TravelMode::Walking);
        assert_eq!(
            path,
            "/route/v1/foot/-93.23,44.97;-93.24,44.98?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn driving_route_converts_units() {
        let client = RoutingClient::new(FakeRouter::always(osrm_body(1609.34, 600.0)));
        let route = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Driving,
        ))
        .unwrap();

        assert!((route.distance_miles - 1.0).abs() < 1e-9);
        assert!((route.duration_minutes - 10.0).abs() < 1e-9);
        assert_eq!(route.geometry.kind, "LineString");
        assert_eq!(route.geometry.coordinates.len(), 2);
    }

    #[test]
    fn walking_duration_is_inflated() {
        let client = RoutingClient::new(FakeRouter::always(osrm_body(1609.34, 600.0)));
        let route = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Walking,
        ))
        .unwrap();

        assert!((route.duration_minutes - 14.0).abs() < 1e-9);
        assert!((route.distance_miles - 1.0).abs() < 1e-9);
    }

    #[test]
    fn walking_factor_follows_config() {
        let config = NavConfig {
            walking_duration_factor: 1.0,
            ..NavConfig::default()
        };
        let client =
            RoutingClient::from_config(FakeRouter::always(osrm_body(1000.0, 600.0)), &config);
        let route = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Walking,
        ))
        .unwrap();

        assert!((route.duration_minutes - 10.0).abs() < 1e-9);
    }

    #[test]
    fn non_ok_code_is_no_route() {
        let body = r#"{"code":"NoRoute","routes":[]}"#;
        let client = RoutingClient::new(FakeRouter::always(body.to_string()));
        let err = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Driving,
        ))
        .unwrap_err();
        assert_eq!(err, RoutingError::NoRoute);
    }

    #[test]
    fn empty_routes_is_no_route() {
        let body = r#"{"code":"Ok","routes":[]}"#;
        let client = RoutingClient::new(FakeRouter::always(body.to_string()));
        let err = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Driving,
        ))
        .unwrap_err();
        assert_eq!(err, RoutingError::NoRoute);
    }

    #[test]
    fn transport_failure_propagates() {
        let client = RoutingClient::new(FakeRouter::offline());
        let err = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Driving,
        ))
        .unwrap_err();
        assert!(matches!(err, RoutingError::NetworkFailure(_)));
    }

    #[test]
    fn garbage_body_is_network_failure() {
        let client = RoutingClient::new(FakeRouter::always("<html>".to_string()));
        let err = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(44.98, -93.24),
            TravelMode::Driving,
        ))
        .unwrap_err();
        assert!(matches!(err, RoutingError::NetworkFailure(_)));
    }

    #[test]
    fn non_finite_destination_is_rejected_before_request() {
        let router = FakeRouter::always(osrm_body(1000.0, 60.0));
        let client = RoutingClient::new(router);
        let err = block_on(client.fetch_route(
            pt(44.97, -93.23),
            pt(f64::NAN, -93.24),
            TravelMode::Driving,
        ))
        .unwrap_err();

        assert_eq!(err, RoutingError::InvalidDestination);
        assert!(client.provider().requests().is_empty());
    }

    #[test]
    fn fetch_for_uses_current_position_as_origin() {
        let gps = FakeGps::at(pt(44.97, -93.23));
        let client = RoutingClient::new(FakeRouter::always(osrm_body(1609.34, 60.0)));
        let request = RouteRequest {
            token: 7,
            destination: pt(44.98, -93.24),
            mode: TravelMode::Driving,
        };

        let fetch = block_on(client.fetch_for(&gps, request));
        assert_eq!(fetch.request, request);
        assert!(fetch.result.is_ok());
        assert_eq!(
            client.provider().requests(),
            vec!["/route/v1/car/-93.23,44.97;-93.24,44.98?overview=full&geometries=geojson"]
        );
    }

    #[test]
    fn fetch_for_rejects_zero_filled_origin() {
        let gps = FakeGps::at(pt(0.0, 0.0));
        let client = RoutingClient::new(FakeRouter::always(osrm_body(1000.0, 60.0)));
        let request = RouteRequest {
            token: 3,
            destination: pt(44.98, -93.24),
            mode: TravelMode::Driving,
        };

        let fetch = block_on(client.fetch_for(&gps, request));
        assert_eq!(
            fetch.result.unwrap_err(),
            NavError::Position(PositionError::Unavailable)
        );
        assert!(client.provider().requests().is_empty());
    }

    #[test]
    fn fetch_for_reports_position_failure() {
        let gps = FakeGps::failing(PositionError::PermissionDenied);
        let client = RoutingClient::new(FakeRouter::always(osrm_body(1000.0, 60.0)));
        let request = RouteRequest {
            token: 1,
            destination: pt(44.98, -93.24),
            mode: TravelMode::Walking,
        };

        let fetch = block_on(client.fetch_for(&gps, request));
        assert_eq!(
            fetch.result.unwrap_err(),
            NavError::Position(PositionError::PermissionDenied)
        );
        assert!(client.provider().requests().is_empty());
    }
}
