//! Reverse geocoding: coordinate to raw (locality, region) names.
//!
//! Two providers exist. The primary one needs an API key and answers with
//! tagged address components; the fallback one is keyless and answers with
//! a flat address object. Which one is used is decided once, from settings,
//! when the [`Geocoder`] is built.

use async_trait::async_trait;
use log::debug;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::configuration::GeocodingSettings;
use crate::error::ProviderError;
use crate::models::{Coordinate, RawPlace};

const LOCALITY_TAG: &str = "administrative_area_level_2";
const REGION_TAG: &str = "administrative_area_level_1";

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coordinate: Coordinate) -> Result<RawPlace, ProviderError>;
}

async fn fetch_body(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status));
    }
    Ok(response.text().await?)
}

#[derive(Deserialize)]
struct ComponentsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<ComponentsResult>,
}

#[derive(Deserialize)]
struct ComponentsResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// Key-authenticated provider answering with tagged address components.
pub struct PrimaryGeocoder {
    client: reqwest::Client,
    endpoint: String,
    key: Secret<String>,
}

impl PrimaryGeocoder {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, key: Secret<String>) -> Self {
        PrimaryGeocoder {
            client,
            endpoint: endpoint.into(),
            key,
        }
    }

    /// Extracts the place from a response body. Only the first result is
    /// inspected, and within it the first component carrying a tag wins.
    fn place_from_body(body: &str) -> Result<RawPlace, ProviderError> {
        let response: ComponentsResponse = serde_json::from_str(body)?;
        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                return Err(ProviderError::Rejected(match response.error_message {
                    Some(message) => format!("{}: {}", other, message),
                    None => other.to_string(),
                }))
            }
        }
        let components = response
            .results
            .into_iter()
            .next()
            .map(|r| r.address_components)
            .unwrap_or_default();
        let first_tagged = |tag: &str| {
            components
                .iter()
                .find(|c| c.types.iter().any(|t| t == tag))
                .map(|c| c.long_name.clone())
                .unwrap_or_default()
        };
        Ok(RawPlace {
            locality: first_tagged(LOCALITY_TAG),
            region: first_tagged(REGION_TAG),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for PrimaryGeocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<RawPlace, ProviderError> {
        let latlng = format!("{},{}", coordinate.latitude, coordinate.longitude);
        let request = self.client.get(&self.endpoint).query(&[
            ("latlng", latlng.as_str()),
            ("key", self.key.expose_secret().as_str()),
        ]);
        let body = fetch_body(request).await?;
        Self::place_from_body(&body)
    }
}

#[derive(Deserialize)]
struct FlatResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<FlatAddress>,
}

#[derive(Deserialize, Default)]
struct FlatAddress {
    county: Option<String>,
    district: Option<String>,
    city: Option<String>,
    region: Option<String>,
    state: Option<String>,
}

/// Keyless provider answering with a flat address object.
pub struct FallbackGeocoder {
    client: reqwest::Client,
    endpoint: String,
    zoom: u8,
}

impl FallbackGeocoder {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, zoom: u8) -> Self {
        FallbackGeocoder {
            client,
            endpoint: endpoint.into(),
            zoom,
        }
    }

    /// Locality is the first non-empty of county, district, city, region.
    fn place_from_body(body: &str) -> Result<RawPlace, ProviderError> {
        let response: FlatResponse = serde_json::from_str(body)?;
        if let Some(error) = response.error {
            return Err(ProviderError::Rejected(error));
        }
        let address = response
            .address
            .ok_or_else(|| ProviderError::Malformed("response has no address".to_string()))?;
        let locality = [address.county, address.district, address.city, address.region]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default();
        Ok(RawPlace {
            locality,
            region: address.state.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for FallbackGeocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<RawPlace, ProviderError> {
        let request = self.client.get(&self.endpoint).query(&[
            ("format", "json".to_string()),
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("zoom", self.zoom.to_string()),
            ("addressdetails", "1".to_string()),
        ]);
        let body = fetch_body(request).await?;
        Self::place_from_body(&body)
    }
}

/// The provider chosen for this process.
pub enum Geocoder {
    Primary(PrimaryGeocoder),
    Fallback(FallbackGeocoder),
}

impl Geocoder {
    /// Primary when a non-empty key is configured, otherwise fallback.
    pub fn from_settings(settings: &GeocodingSettings, client: reqwest::Client) -> Self {
        match settings.primary_key() {
            Some(key) => Geocoder::Primary(PrimaryGeocoder::new(
                client,
                settings.primary_url.clone(),
                key.clone(),
            )),
            None => Geocoder::Fallback(FallbackGeocoder::new(
                client,
                settings.fallback_url.clone(),
                settings.fallback_zoom,
            )),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Geocoder::Primary(_) => "primary",
            Geocoder::Fallback(_) => "fallback",
        }
    }
}

#[async_trait]
impl ReverseGeocoder for Geocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<RawPlace, ProviderError> {
        debug!("Reverse geocoding {:?} via {} provider", coordinate, self.provider_name());
        match self {
            Geocoder::Primary(g) => g.reverse(coordinate).await,
            Geocoder::Fallback(g) => g.reverse(coordinate).await,
        }
    }
}
