//! Error types shared across the navigation core.
//!
//! None of these are fatal to the host page. The session recovers every
//! one of them and turns it into a display-only notice.

use thiserror::Error;

use crate::position::PositionError;

/// Failure to obtain a route from the routing provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("no route found to destination")]
    NoRoute,

    #[error("routing request failed: {0}")]
    NetworkFailure(String),

    #[error("destination coordinates are not valid")]
    InvalidDestination,
}

/// Rejected navigation session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no destination selected")]
    NoDestination,

    #[error("navigation is already active")]
    AlreadyTracking,
}

/// Failure talking to the parking directory backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    #[error("sign in required")]
    Unauthorized,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("directory request failed: {0}")]
    Transport(String),

    #[error("malformed directory response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Malformed(e.to_string())
    }
}

/// Any failure the navigation session recovers from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Position(#[from] PositionError),
}
