use crate::geocode::{Coordinate, Gazetteer};
use crate::locations::LocationTable;

/// Where the place part of a caption came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    /// No place resolved; the caption is the bare year.
    None,
    /// Locality reverse geocoded from the photo's GPS position.
    GpsCity,
    /// Place taken from the locations table.
    TableMatch,
}

impl std::fmt::Display for CaptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CaptionSource::None => "year only",
            CaptionSource::GpsCity => "city from GPS",
            CaptionSource::TableMatch => "table match",
        })
    }
}

/// The caption to stamp onto a photo.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCaption {
    /// `"{year}"` or `"{year}, {place}"`.
    pub text: String,
    /// Diagnostic origin of the place part, for log lines.
    pub source: CaptionSource,
}

/// Decide the caption for a photo captured in `year`.
///
/// The photo's position (when known) is reverse geocoded first, then the
/// locations table is consulted for the year:
///
/// - no row → the GPS locality, or failing that the bare year;
/// - exactly one row → that place, trusted as-is (no lookups spent on it);
/// - several rows → the row whose geocoded position is nearest the photo.
///   Rows that fail to geocode are skipped, ties keep the earlier row, and
///   if nothing geocodes (or the photo has no position) the first row wins.
///
/// A table place always outranks the GPS locality. Resolution never fails;
/// every lookup miss degrades one step down the cascade.
pub async fn resolve_caption(
    year: i32,
    coordinate: Option<Coordinate>,
    table: &LocationTable,
    gazetteer: &dyn Gazetteer,
) -> ResolvedCaption {
    let city = match coordinate {
        Some(position) => gazetteer.reverse_geocode(position).await,
        None => None,
    };

    let matches = table.lookup_by_year(year);
    let matched = match (matches.len(), coordinate) {
        (0, _) => None,
        (1, _) => Some(matches[0]),
        (_, None) => Some(matches[0]),
        (_, Some(position)) => Some(nearest_candidate(&matches, position, gazetteer).await),
    };

    if let Some(place) = matched {
        log::debug!("Caption from table: {year}, {place}");
        return ResolvedCaption {
            text: format!("{year}, {place}"),
            source: CaptionSource::TableMatch,
        };
    }
    if let Some(city) = city {
        log::debug!("Caption from GPS locality: {year}, {city}");
        return ResolvedCaption {
            text: format!("{year}, {city}"),
            source: CaptionSource::GpsCity,
        };
    }

    log::debug!("No place resolved for {year}, using bare year");
    ResolvedCaption {
        text: year.to_string(),
        source: CaptionSource::None,
    }
}

/// Geocode each candidate in table order and keep the one closest to the
/// photo position. The comparison is strict, so equidistant candidates keep
/// the earlier row.
async fn nearest_candidate<'a>(
    candidates: &[&'a str],
    position: Coordinate,
    gazetteer: &dyn Gazetteer,
) -> &'a str {
    let mut best: Option<(&'a str, f64)> = None;

    for &candidate in candidates {
        let Some(location) = gazetteer.geocode(candidate).await else {
            log::debug!("Cannot geocode table entry {candidate:?}, skipping");
            continue;
        };
        let distance = position.distance_km(&location);
        log::debug!("  {candidate}: {distance:.1} km away");

        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }

    match best {
        Some((place, _)) => place,
        None => candidates[0],
    }
}
