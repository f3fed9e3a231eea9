use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::alerts::domain::RouteSummary;
use crate::geo::Coordinates;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("routing service returned {0}")]
    Status(StatusCode),
    #[error("routing response contained no route")]
    NoRoute,
}

/// One candidate route between an origin and a destination. Callers treat any
/// failure as "no route" and continue.
#[async_trait]
pub trait RoutingGateway: Send + Sync {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError>;
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    distance: f64,
    duration: f64,
}

/// OSRM-compatible `route/v1/driving` client. Note the `lon,lat` path
/// ordering the protocol requires.
pub struct OsrmGateway {
    client: Client,
    base_url: String,
}

impl OsrmGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoutingGateway for OsrmGateway {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            origin.lon,
            origin.lat,
            destination.lon,
            destination.lat
        );
        let response = self
            .client
            .get(url)
            .query(&[("overview", "full")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RoutingError::Status(response.status()));
        }

        let body: OsrmResponse = response.json().await?;
        let route = body.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
        Ok(RouteSummary {
            geometry: route.geometry,
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_route_list_maps_to_no_route() {
        let body: OsrmResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).expect("parses");
        assert!(body.routes.is_empty());
    }

    #[test]
    fn route_fields_deserialize() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{"routes": [{"geometry": "_p~iF~ps|U", "distance": 5210.4, "duration": 612.0}]}"#,
        )
        .expect("parses");
        let route = &body.routes[0];
        assert_eq!(route.geometry, "_p~iF~ps|U");
        assert!((route.distance - 5210.4).abs() < f64::EPSILON);
    }
}
