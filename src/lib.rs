pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod position;
pub mod present;
pub mod route;
pub mod routing;
pub mod session;

#[cfg(feature = "http")]
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use config::NavConfig;
pub use error::{DirectoryError, NavError, RoutingError, SessionError};
pub use geo::{great_circle_miles, Coordinate};
pub use position::{PositionError, PositionSource, WatchHandle};
pub use present::{MapView, MarkerKind, StatusField, StatusPanel};
pub use route::{estimate_eta_minutes, format_eta, RouteSummary, TravelMode};
pub use routing::{RoutingClient, RoutingProvider};
pub use session::{NavigationSession, SessionState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
