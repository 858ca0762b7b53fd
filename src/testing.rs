//! Test doubles for the host capabilities.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::RoutingError;
use crate::geo::Coordinate;
use crate::position::{PositionError, PositionSource, WatchHandle, WatchOptions};
use crate::present::{MapView, MarkerKind, StatusField, StatusPanel};
use crate::routing::RouteGeometry;

/// OSRM response body with a single two-point route.
pub fn osrm_body(distance_m: f64, duration_s: f64) -> String {
    format!(
        r#"{{"code":"Ok","routes":[{{"distance":{distance_m},"duration":{duration_s},"geometry":{{"type":"LineString","coordinates":[[-93.23,44.97],[-93.24,44.98]]}}}}]}}"#
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    PlaceMarker(MarkerKind, Coordinate),
    RemoveMarker(MarkerKind),
    /// Number of vertices drawn.
    DrawRoute(usize),
    ClearRoute,
    FlyTo(Coordinate, f64),
}

#[derive(Debug, Default)]
pub struct FakeMap {
    pub calls: Vec<MapCall>,
}

impl MapView for FakeMap {
    fn place_marker(&mut self, kind: MarkerKind, at: Coordinate) {
        self.calls.push(MapCall::PlaceMarker(kind, at));
    }

    fn remove_marker(&mut self, kind: MarkerKind) {
        self.calls.push(MapCall::RemoveMarker(kind));
    }

    fn draw_route(&mut self, geometry: &RouteGeometry) {
        self.calls.push(MapCall::DrawRoute(geometry.coordinates.len()));
    }

    fn clear_route(&mut self) {
        self.calls.push(MapCall::ClearRoute);
    }

    fn fly_to(&mut self, center: Coordinate, zoom: f64) {
        self.calls.push(MapCall::FlyTo(center, zoom));
    }
}

#[derive(Debug, Default)]
pub struct FakePanel {
    texts: HashMap<StatusField, String>,
    missing: HashSet<StatusField>,
    pub navigating: bool,
}

impl FakePanel {
    /// A page lacking the given elements.
    pub fn without(fields: &[StatusField]) -> Self {
        Self {
            missing: fields.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn text(&self, field: StatusField) -> Option<&str> {
        self.texts.get(&field).map(String::as_str)
    }
}

impl StatusPanel for FakePanel {
    fn set_text(&mut self, field: StatusField, text: &str) -> bool {
        if self.missing.contains(&field) {
            return false;
        }
        self.texts.insert(field, text.to_string());
        true
    }

    fn set_navigating(&mut self, active: bool) {
        self.navigating = active;
    }
}

/// Geolocation double. Clones share state, so a test can keep one copy
/// while the session owns another.
#[derive(Debug, Clone)]
pub struct FakeGps {
    fix: Result<Coordinate, PositionError>,
    next_id: Rc<Cell<u64>>,
    active: Rc<RefCell<HashSet<u64>>>,
    watch_error: Option<PositionError>,
}

impl FakeGps {
    pub fn at(fix: Coordinate) -> Self {
        Self {
            fix: Ok(fix),
            next_id: Rc::new(Cell::new(1)),
            active: Rc::default(),
            watch_error: None,
        }
    }

    pub fn failing(error: PositionError) -> Self {
        Self {
            fix: Err(error),
            watch_error: Some(error),
            ..Self::at(Coordinate::new(0.0, 0.0))
        }
    }

    pub fn active_watches(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn watches_started(&self) -> u64 {
        self.next_id.get() - 1
    }
}

impl PositionSource for FakeGps {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        self.fix
    }

    fn watch(&self, _options: &WatchOptions) -> Result<WatchHandle, PositionError> {
        if let Some(e) = self.watch_error {
            return Err(e);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.active.borrow_mut().insert(id);
        Ok(WatchHandle::new(id))
    }

    fn clear_watch(&self, handle: WatchHandle) {
        let released = self.active.borrow_mut().remove(&handle.id());
        assert!(released, "watch {} released twice", handle.id());
    }
}

/// Routing transport double answering from canned bodies.
#[derive(Debug, Default)]
pub struct FakeRouter {
    /// Body by destination `"lon,lat"` suffix; `fallback` otherwise.
    bodies: HashMap<String, String>,
    fallback: Option<String>,
    requests: RefCell<Vec<String>>,
}

impl FakeRouter {
    pub fn always(body: String) -> Self {
        Self {
            fallback: Some(body),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_route_to(mut self, destination: Coordinate, body: String) -> Self {
        self.bodies
            .insert(format!("{},{}", destination.lon, destination.lat), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl crate::routing::RoutingProvider for FakeRouter {
    async fn get(&self, path: &str) -> Result<String, RoutingError> {
        self.requests.borrow_mut().push(path.to_string());

        let coords = path
            .split('?')
            .next()
            .and_then(|p| p.rsplit(';').next())
            .unwrap_or_default();

        self.bodies
            .get(coords)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| RoutingError::NetworkFailure("connection refused".to_string()))
    }
}
