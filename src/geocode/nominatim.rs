use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{Coordinate, Gazetteer};
use crate::config::GeocodingConfig;

/// Gazetteer backed by the OSM Nominatim HTTP API.
///
/// Follows the public-instance usage policy: every request carries an
/// identifying `User-Agent` and consecutive requests are spaced by a
/// configurable minimum interval. Reverse lookups that come back empty
/// (but well-formed) are retried once after a delay; transport errors
/// are not retried.
pub struct NominatimGazetteer {
    base_url: String,
    accept_language: String,
    min_interval: Duration,
    retry_delay: Duration,
    client: Client,
    last_call: Mutex<Option<Instant>>,
}

impl NominatimGazetteer {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
            min_interval: Duration::from_millis(config.call_interval_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            client,
            last_call: Mutex::new(None),
        })
    }

    /// Sleep as needed to keep the configured spacing since the previous
    /// request. The first request goes out immediately.
    async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn reverse_once(&self, coordinate: Coordinate) -> Result<Option<Address>> {
        self.pace().await;

        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let resp = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "jsonv2"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("accept-language", self.accept_language.as_str()),
            ])
            .send()
            .await
            .context("Nominatim reverse request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read Nominatim response")?;
        if !status.is_success() {
            anyhow::bail!("Nominatim reverse error ({status}): {text}");
        }

        let body: ReverseResponse =
            serde_json::from_str(&text).context("Failed to parse Nominatim reverse response")?;

        // A well-formed "nothing here" answer comes back as an error field
        // with HTTP 200.
        if let Some(err) = body.error {
            log::debug!("Nominatim reverse: {err}");
            return Ok(None);
        }
        Ok(body.address)
    }

    async fn search_once(&self, place: &str) -> Result<Option<Coordinate>> {
        self.pace().await;

        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "jsonv2"), ("q", place), ("limit", "1")])
            .send()
            .await
            .context("Nominatim search request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read Nominatim response")?;
        if !status.is_success() {
            anyhow::bail!("Nominatim search error ({status}): {text}");
        }

        let hits: Vec<SearchHit> =
            serde_json::from_str(&text).context("Failed to parse Nominatim search response")?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let latitude = hit
            .lat
            .parse()
            .context("Non-numeric latitude in search result")?;
        let longitude = hit
            .lon
            .parse()
            .context("Non-numeric longitude in search result")?;
        Ok(Some(Coordinate {
            latitude,
            longitude,
        }))
    }
}

#[async_trait::async_trait]
impl Gazetteer for NominatimGazetteer {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Option<String> {
        match self.reverse_once(coordinate).await {
            Ok(Some(address)) => {
                let name = address.locality();
                if name.is_none() {
                    log::debug!(
                        "Nominatim reverse result for ({}, {}) has no locality field",
                        coordinate.latitude,
                        coordinate.longitude
                    );
                }
                name
            }
            Ok(None) => {
                log::debug!("Empty reverse result, retrying once");
                tokio::time::sleep(self.retry_delay).await;
                match self.reverse_once(coordinate).await {
                    Ok(Some(address)) => address.locality(),
                    Ok(None) => None,
                    Err(e) => {
                        log::warn!("Reverse geocoding failed: {e:#}");
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("Reverse geocoding failed: {e:#}");
                None
            }
        }
    }

    async fn geocode(&self, place: &str) -> Option<Coordinate> {
        match self.search_once(place).await {
            Ok(Some(coordinate)) => Some(coordinate),
            Ok(None) => {
                log::debug!("No geocoding result for {place:?}");
                None
            }
            Err(e) => {
                log::warn!("Geocoding {place:?} failed: {e:#}");
                None
            }
        }
    }
}

/// Subset of a Nominatim `jsonv2` reverse response.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

/// Locality fields of a reverse response, most specific first.
#[derive(Debug, Default, Deserialize)]
struct Address {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl Address {
    /// Most specific populated locality field.
    fn locality(&self) -> Option<String> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.municipality,
            &self.county,
            &self.state,
        ]
        .into_iter()
        .find_map(|field| field.clone())
    }
}

/// One hit of a Nominatim `jsonv2` search response. Coordinates are
/// returned as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}
