//! Device position capability.
//!
//! The host implements `PositionSource` over its geolocation API. Watch
//! updates are not pulled through this trait; the host forwards each fix
//! to `NavigationSession::position_update` as it arrives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Failure reported by the geolocation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("User denied the request for Geolocation.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    Unavailable,

    #[error("The request to get user location timed out.")]
    Timeout,

    #[error("An unknown error occurred.")]
    Unknown,
}

impl PositionError {
    /// Map a W3C `GeolocationPositionError.code` value.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => PositionError::PermissionDenied,
            2 => PositionError::Unavailable,
            3 => PositionError::Timeout,
            _ => PositionError::Unknown,
        }
    }
}

/// Options for a continuous position watch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub maximum_age_ms: u32,
    pub timeout_ms: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 0,
            timeout_ms: 5000,
        }
    }
}

/// Token for an active position watch.
///
/// Deliberately not `Clone`: the only way to end a watch is to move the
/// handle into `PositionSource::clear_watch`, so it is released once.
#[derive(Debug, PartialEq, Eq)]
pub struct WatchHandle(u64);

impl WatchHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One-shot and continuous access to the user's position.
#[allow(async_fn_in_trait)]
pub trait PositionSource {
    /// Fetch the current position once.
    async fn current_position(&self) -> Result<Coordinate, PositionError>;

    /// Start delivering position updates to the host.
    fn watch(&self, options: &WatchOptions) -> Result<WatchHandle, PositionError>;

    /// Stop a watch started by `watch`.
    fn clear_watch(&self, handle: WatchHandle);
}
