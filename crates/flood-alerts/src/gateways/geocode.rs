use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

/// Address fragments from most to least specific, as returned by a
/// Nominatim-style reverse lookup. Absent fields deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressParts {
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
}

impl AddressParts {
    fn locality(&self) -> Option<&str> {
        non_empty(&self.neighbourhood).or_else(|| non_empty(&self.suburb))
    }

    fn city_level(&self) -> Option<&str> {
        non_empty(&self.city)
            .or_else(|| non_empty(&self.town))
            .or_else(|| non_empty(&self.village))
    }

    /// Compose the most specific available parts joined with ", ". Empty when
    /// every part is blank.
    pub fn compose(&self) -> String {
        [self.locality(), self.city_level(), non_empty(&self.state)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_empty(part: &Option<String>) -> Option<&str> {
    part.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoding service returned {0}")]
    Status(StatusCode),
}

/// Single reverse-geocode lookup seam.
#[async_trait]
pub trait GeocodeGateway: Send + Sync {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<AddressParts, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: AddressParts,
}

/// Nominatim `reverse?format=jsonv2` client.
pub struct NominatimGateway {
    client: Client,
    base_url: String,
}

impl NominatimGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeocodeGateway for NominatimGateway {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<AddressParts, GeocodeError> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            // Nominatim's usage policy requires an identifying user agent.
            .header(USER_AGENT, "flood-alerts/0.1")
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let body: ReverseResponse = response.json().await?;
        Ok(body.address)
    }
}

/// Resolve a human-readable name for a coordinate pair, degrading to the
/// coordinates themselves whenever the lookup fails or comes back empty.
pub async fn resolve_location_name<G>(gateway: &G, lat: f64, lon: f64) -> String
where
    G: GeocodeGateway + ?Sized,
{
    match gateway.reverse(lat, lon).await {
        Ok(parts) => {
            let name = parts.compose();
            if name.is_empty() {
                coordinate_fallback(lat, lon)
            } else {
                name
            }
        }
        Err(err) => {
            warn!(error = %err, lat, lon, "reverse geocoding failed, using coordinate fallback");
            coordinate_fallback(lat, lon)
        }
    }
}

fn coordinate_fallback(lat: f64, lon: f64) -> String {
    format!("{lat:.4}, {lon:.4}")
}
