//! HTTP transports built on reqwest.
//!
//! Enabled with the `http` feature. Hosts that bring their own fetch
//! implementation can skip this module and implement `RoutingProvider`
//! and `ParkingDirectory` directly.

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;

use crate::config::NavConfig;
use crate::directory::{
    self, CurrentUser, NewSpot, ParkingDirectory, ParkingSpot, ProfileUpdate,
    RecommendationQuery, SpotFilter, UserProfile,
};
use crate::error::{DirectoryError, RoutingError};
use crate::routing::RoutingProvider;

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// OSRM routing over HTTP.
pub struct HttpRoutingProvider {
    client: Client,
    base_url: String,
}

impl HttpRoutingProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &NavConfig) -> Self {
        Self::new(config.routing_base_url.clone())
    }
}

impl RoutingProvider for HttpRoutingProvider {
    async fn get(&self, path: &str) -> Result<String, RoutingError> {
        let network = |e: reqwest::Error| RoutingError::NetworkFailure(e.to_string());

        // OSRM reports "no route" with a 4xx status and a JSON body, so the
        // body is returned regardless of status.
        let response = self
            .client
            .get(join(&self.base_url, path))
            .send()
            .await
            .map_err(network)?;
        debug!("Routing service returned {}", response.status());

        response.text().await.map_err(network)
    }
}

/// The parking backend's JSON API.
pub struct HttpDirectory {
    client: Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(join(&self.base_url, path))
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        self.client.post(join(&self.base_url, path)).json(body)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, DirectoryError> {
        let transport = |e: reqwest::Error| DirectoryError::Transport(e.to_string());

        let response = request.send().await.map_err(transport)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(DirectoryError::Unauthorized);
        }
        response.text().await.map_err(transport)
    }
}

impl ParkingDirectory for HttpDirectory {
    async fn current_user(&self) -> Result<Option<UserProfile>, DirectoryError> {
        let body = self.send(self.get("/api/current-user")).await?;
        let current: CurrentUser = serde_json::from_str(&body)?;
        Ok(current.into_user())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), DirectoryError> {
        let body = self.send(self.post("/api/update-profile", update)).await?;
        directory::decode_unit(&body)
    }

    async fn filter_spots(&self, filter: &SpotFilter) -> Result<Vec<ParkingSpot>, DirectoryError> {
        let request = self
            .get("/api/parking-spots/filter")
            .query(&filter.query_pairs());
        let body = self.send(request).await?;
        directory::decode(&body)
    }

    async fn search(&self, query: &str) -> Result<Vec<ParkingSpot>, DirectoryError> {
        let request = self.get("/api/search").query(&[("q", query)]);
        let body = self.send(request).await?;
        directory::decode(&body)
    }

    async fn add_spot(&self, spot: &NewSpot) -> Result<(), DirectoryError> {
        let body = self.send(self.post("/api/add-parking-spot", spot)).await?;
        directory::decode_unit(&body)
    }

    async fn recommendations(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<ParkingSpot>, DirectoryError> {
        let body = self.send(self.post("/api/recommendations", query)).await?;
        directory::decode(&body)
    }
}
