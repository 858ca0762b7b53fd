//! Navigation session state machine.
//!
//! One `NavigationSession` exists per page. It moves through
//!
//! ```text
//! Idle --set_destination--> RoutePreview --start--> Tracking
//!  ^                            |                      |
//!  +-------cancel_preview-------+                      |
//!  +---------------stop / arrival----------------------+
//! ```
//!
//! The session never awaits. Route fetches are issued as `RouteRequest`
//! tickets; the host resolves them (see `RoutingClient::fetch_for`) and
//! hands the `RouteFetch` back to `complete_route`. Only the newest
//! ticket is applied, so out-of-order completions are dropped.
//!
//! Position watch updates are forwarded by the host to `position_update`
//! in the order the platform delivers them.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::NavConfig;
use crate::error::{NavError, SessionError};
use crate::geo::{great_circle_miles, Coordinate};
use crate::position::{PositionError, PositionSource, WatchHandle};
use crate::present::{MapView, NavigationStats, Notice, Presenter, StatusPanel};
use crate::route::{estimate_eta_minutes_with, RouteSummary, TravelMode};
use crate::routing::{RouteFetch, RouteRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    RoutePreview,
    Tracking,
}

/// What a position update did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionOutcome {
    /// Not tracking, or the fix was unusable.
    Ignored,
    Progress(NavigationStats),
    /// Within the arrival radius; the session is back to idle.
    Arrived(NavigationStats),
}

/// What a completed route fetch did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Applied(RouteSummary),
    /// Superseded by a newer request, or the session moved on.
    Stale,
    Failed(NavError),
}

pub struct NavigationSession<P: PositionSource, V: MapView, S: StatusPanel> {
    config: NavConfig,
    positions: P,
    presenter: Presenter<V, S>,
    state: SessionState,
    destination: Option<Coordinate>,
    mode: TravelMode,
    route_summary: Option<RouteSummary>,
    watch: Option<WatchHandle>,
    last_user_position: Option<Coordinate>,
    /// Token of the newest route request; 0 before the first one.
    latest_request: u64,
}

impl<P: PositionSource, V: MapView, S: StatusPanel> NavigationSession<P, V, S> {
    pub fn new(positions: P, map: V, panel: S, config: NavConfig) -> Self {
        let presenter = Presenter::new(map, panel, config.destination_zoom, config.tracking_zoom);
        Self {
            config,
            positions,
            presenter,
            state: SessionState::Idle,
            destination: None,
            mode: TravelMode::default(),
            route_summary: None,
            watch: None,
            last_user_position: None,
            latest_request: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.destination
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn route_summary(&self) -> Option<&RouteSummary> {
        self.route_summary.as_ref()
    }

    pub fn last_user_position(&self) -> Option<Coordinate> {
        self.last_user_position
    }

    pub fn is_tracking(&self) -> bool {
        self.watch.is_some()
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn positions(&self) -> &P {
        &self.positions
    }

    pub fn presenter(&self) -> &Presenter<V, S> {
        &self.presenter
    }

    /// Select a destination and request a route to it.
    ///
    /// Allowed while idle or previewing. A destination that is not finite,
    /// out of range, or `(0, 0)` counts as no destination.
    pub fn set_destination(&mut self, destination: Coordinate) -> Result<RouteRequest, SessionError> {
        if self.state == SessionState::Tracking {
            return Err(self.reject(SessionError::AlreadyTracking));
        }
        let Some(destination) = destination.usable() else {
            return Err(self.reject(SessionError::NoDestination));
        };

        if let Some(area) = &self.config.service_area {
            if !area.contains(&destination) {
                warn!(
                    "Destination {:.5},{:.5} is outside the service area",
                    destination.lat, destination.lon
                );
            }
        }

        if self.state == SessionState::RoutePreview {
            // Previous destination's route must not outlive it
            self.presenter.clear_route();
        }

        info!("Previewing route to {:.5},{:.5}", destination.lat, destination.lon);
        self.destination = Some(destination);
        self.state = SessionState::RoutePreview;
        self.presenter.show_destination(destination);

        Ok(self.issue_request(destination))
    }

    /// Switch travel mode.
    ///
    /// While idle this only records the preference. Otherwise the route is
    /// requested again for the new mode.
    pub fn change_mode(&mut self, mode: TravelMode) -> Option<RouteRequest> {
        self.mode = mode;
        match (self.state, self.destination) {
            (SessionState::Idle, _) | (_, None) => None,
            (_, Some(destination)) => Some(self.issue_request(destination)),
        }
    }

    /// Apply a resolved route fetch.
    pub fn complete_route(&mut self, fetch: RouteFetch) -> RouteOutcome {
        let request = fetch.request;
        let current = request.token == self.latest_request
            && self.state != SessionState::Idle
            && self.destination == Some(request.destination);

        if !current {
            debug!(
                "Discarding stale route for request {} (latest {})",
                request.token, self.latest_request
            );
            return RouteOutcome::Stale;
        }

        match fetch.result {
            Ok(route) => {
                let summary = route.summary(request.mode);
                self.route_summary = Some(summary);
                self.presenter.show_route(&route);
                RouteOutcome::Applied(summary)
            }
            Err(e) => {
                warn!("Route fetch failed: {e}");
                self.route_summary = None;
                self.presenter.clear_route();
                self.presenter.notify(&Notice::RouteUnavailable);
                RouteOutcome::Failed(e)
            }
        }
    }

    /// Begin live tracking toward the previewed destination.
    ///
    /// Works without a route summary; ETA then uses the fallback speeds.
    pub fn start(&mut self) -> Result<(), NavError> {
        match self.state {
            SessionState::Tracking => return Err(self.reject(SessionError::AlreadyTracking).into()),
            SessionState::Idle => return Err(self.reject(SessionError::NoDestination).into()),
            SessionState::RoutePreview => {}
        }
        if !self.destination.is_some_and(|d| d.is_finite()) {
            return Err(self.reject(SessionError::NoDestination).into());
        }

        self.release_watch();
        let handle = self.positions.watch(&self.config.watch).map_err(|e| {
            self.presenter.notify(&Notice::Failure(e.into()));
            NavError::from(e)
        })?;

        info!("Navigation started ({:?})", self.mode);
        self.watch = Some(handle);
        self.state = SessionState::Tracking;
        self.presenter.begin_tracking();
        Ok(())
    }

    /// Process one position fix from the watch.
    pub fn position_update(&mut self, position: Coordinate) -> PositionOutcome {
        if self.state != SessionState::Tracking {
            debug!("Ignoring position update while {:?}", self.state);
            return PositionOutcome::Ignored;
        }
        if !position.is_finite() {
            warn!("Ignoring non-finite position fix");
            return PositionOutcome::Ignored;
        }
        let Some(destination) = self.destination else {
            return PositionOutcome::Ignored;
        };

        self.last_user_position = Some(position);

        let remaining_miles = great_circle_miles(&position, &destination);
        let eta_minutes = estimate_eta_minutes_with(
            self.route_summary.as_ref(),
            self.mode,
            remaining_miles,
            &self.config.fallback_speeds,
        );
        let arrived = remaining_miles < self.config.arrival_radius_miles;

        let stats = NavigationStats {
            position,
            remaining_miles,
            eta_minutes,
            arrived,
        };
        self.presenter.show_progress(&stats);

        if arrived {
            self.stop(true);
            PositionOutcome::Arrived(stats)
        } else {
            PositionOutcome::Progress(stats)
        }
    }

    /// Report a geolocation failure. Tracking continues.
    pub fn position_failed(&mut self, error: PositionError) {
        self.presenter.notify(&Notice::Failure(error.into()));
    }

    /// End tracking. Returns `false` (and does nothing) unless tracking.
    pub fn stop(&mut self, arrived: bool) -> bool {
        if self.state != SessionState::Tracking {
            debug!("Stop requested while {:?}, nothing to do", self.state);
            return false;
        }

        self.release_watch();
        self.reset();
        self.presenter.tear_down(arrived);

        if arrived {
            info!("Arrived at destination");
        } else {
            info!("Navigation ended");
        }
        true
    }

    /// Abandon a preview without tracking.
    pub fn cancel_preview(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Tracking => Err(self.reject(SessionError::AlreadyTracking)),
            SessionState::RoutePreview => {
                self.reset();
                self.presenter.tear_down(false);
                info!("Route preview cancelled");
                Ok(())
            }
        }
    }

    fn issue_request(&mut self, destination: Coordinate) -> RouteRequest {
        self.latest_request += 1;
        self.route_summary = None;
        RouteRequest {
            token: self.latest_request,
            destination,
            mode: self.mode,
        }
    }

    /// Back to idle. Bumps the request token so in-flight fetches go stale.
    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.destination = None;
        self.route_summary = None;
        self.last_user_position = None;
        self.latest_request += 1;
    }

    fn release_watch(&mut self) {
        if let Some(handle) = self.watch.take() {
            debug!("Releasing position watch {}", handle.id());
            self.positions.clear_watch(handle);
        }
    }

    fn reject(&mut self, error: SessionError) -> SessionError {
        self.presenter.notify(&Notice::Failure(error.into()));
        error
    }
}

impl<P: PositionSource, V: MapView, S: StatusPanel> Drop for NavigationSession<P, V, S> {
    fn drop(&mut self) {
        self.release_watch();
    }
}
