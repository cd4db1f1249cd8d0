mod nominatim;

pub use nominatim::NominatimGazetteer;

use serde::{Deserialize, Serialize};

/// A position in decimal degrees.
///
/// Latitude is positive north of the equator, longitude positive east of
/// the prime meridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle (haversine) distance to another position, in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let here = geoutils::Location::new(self.latitude, self.longitude);
        let there = geoutils::Location::new(other.latitude, other.longitude);
        here.haversine_distance_to(&there).meters() / 1000.0
    }
}

/// Trait for place-name lookup services.
///
/// Both directions return `Option`: a miss is an expected outcome, not an
/// error, and callers degrade gracefully. Implement this trait to swap in a
/// different provider; the library ships with [`NominatimGazetteer`].
///
/// # Example
///
/// ```rust,no_run
/// use placestamp::config::GeocodingConfig;
/// use placestamp::geocode::{Coordinate, Gazetteer, NominatimGazetteer};
///
/// # async fn example() -> anyhow::Result<()> {
/// let gazetteer = NominatimGazetteer::new(&GeocodingConfig::default())?;
/// let city = gazetteer
///     .reverse_geocode(Coordinate::new(48.8566, 2.3522))
///     .await;
/// println!("City: {city:?}");
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait Gazetteer: Send + Sync {
    /// Name of the nearest locality (city, town, ...) for a position.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Option<String>;

    /// Position of a free-form place name.
    async fn geocode(&self, place: &str) -> Option<Coordinate>;
}
