//! Presentation of navigation state.
//!
//! `Presenter` turns session events into map operations and display
//! strings. It keeps no navigation state of its own. The host page
//! supplies a `MapView` and a `StatusPanel`; a page may lack any of the
//! text elements, which only skips that element.

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::NavError;
use crate::geo::Coordinate;
use crate::route::format_eta;
use crate::routing::{Route, RouteGeometry};

/// Markers the navigation core places on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Destination,
    User,
}

/// Map operations used by the navigation core.
pub trait MapView {
    /// Place `kind` at `at`, moving it if already present.
    fn place_marker(&mut self, kind: MarkerKind, at: Coordinate);

    /// Remove `kind` if present.
    fn remove_marker(&mut self, kind: MarkerKind);

    /// Draw the route polyline, replacing any previous one.
    fn draw_route(&mut self, geometry: &RouteGeometry);

    /// Remove the route polyline if present.
    fn clear_route(&mut self);

    fn fly_to(&mut self, center: Coordinate, zoom: f64);
}

/// Text elements the navigation core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    RouteDistance,
    RouteDuration,
    DistanceLeft,
    Eta,
    Notice,
}

/// Text sink for the host page.
pub trait StatusPanel {
    /// Set the text of `field`. Returns `false` if the page has no such element.
    fn set_text(&mut self, field: StatusField, text: &str) -> bool;

    /// Show or hide the live navigation overlay.
    fn set_navigating(&mut self, _active: bool) {}
}

/// Derived figures for one position update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationStats {
    pub position: Coordinate,
    pub remaining_miles: f64,
    pub eta_minutes: u32,
    pub arrived: bool,
}

/// Inline, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RouteUnavailable,
    Failure(NavError),
    Arrived,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RouteUnavailable => write!(f, "Route info unavailable"),
            Notice::Failure(e) => write!(f, "{e}"),
            Notice::Arrived => write!(f, "You have arrived at your destination!"),
        }
    }
}

pub fn route_distance_label(miles: f64) -> String {
    format!("{miles:.1} mi")
}

/// Preview duration, never below one minute.
pub fn route_duration_label(minutes: f64) -> String {
    format!("{} min", minutes.round().max(1.0) as i64)
}

pub fn distance_left_label(miles: f64) -> String {
    format!("{miles:.2} mi")
}

pub struct Presenter<V, S> {
    map: V,
    panel: S,
    destination_zoom: f64,
    tracking_zoom: f64,
}

impl<V: MapView, S: StatusPanel> Presenter<V, S> {
    pub fn new(map: V, panel: S, destination_zoom: f64, tracking_zoom: f64) -> Self {
        Self {
            map,
            panel,
            destination_zoom,
            tracking_zoom,
        }
    }

    pub fn map(&self) -> &V {
        &self.map
    }

    pub fn panel(&self) -> &S {
        &self.panel
    }

    pub fn show_destination(&mut self, destination: Coordinate) {
        self.map.place_marker(MarkerKind::Destination, destination);
        self.map.fly_to(destination, self.destination_zoom);
    }

    pub fn show_route(&mut self, route: &Route) {
        self.map.draw_route(&route.geometry);
        self.set(StatusField::RouteDistance, &route_distance_label(route.distance_miles));
        self.set(StatusField::RouteDuration, &route_duration_label(route.duration_minutes));
    }

    /// Drop a route that no longer matches the session.
    pub fn clear_route(&mut self) {
        self.map.clear_route();
        self.set(StatusField::RouteDistance, "…");
        self.set(StatusField::RouteDuration, "…");
    }

    pub fn begin_tracking(&mut self) {
        self.panel.set_navigating(true);
    }

    pub fn show_progress(&mut self, stats: &NavigationStats) {
        self.map.place_marker(MarkerKind::User, stats.position);
        self.set(StatusField::DistanceLeft, &distance_left_label(stats.remaining_miles));
        self.set(StatusField::Eta, &format_eta(f64::from(stats.eta_minutes)));
        self.map.fly_to(stats.position, self.tracking_zoom);
    }

    /// Remove every navigation artifact from the map and hide the overlay.
    pub fn tear_down(&mut self, arrived: bool) {
        self.panel.set_navigating(false);
        self.map.remove_marker(MarkerKind::User);
        self.map.remove_marker(MarkerKind::Destination);
        self.map.clear_route();
        if arrived {
            self.notify(&Notice::Arrived);
        }
    }

    pub fn notify(&mut self, notice: &Notice) {
        match notice {
            Notice::Arrived => info!("{notice}"),
            _ => warn!("{notice}"),
        }
        self.set(StatusField::Notice, &notice.to_string());
    }

    fn set(&mut self, field: StatusField, text: &str) {
        if !self.panel.set_text(field, text) {
            debug!("No display element for {field:?}");
        }
    }
}
