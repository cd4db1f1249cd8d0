use nom_exif::*;
use std::path::Path;

use crate::geocode::Coordinate;

/// Capture metadata extracted from a photo's embedded EXIF block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureInfo {
    /// Four-digit capture year, when a date tag is present and parseable.
    pub year: Option<i32>,
    /// Decimal-degree GPS position, when the GPS IFD is present.
    pub coordinate: Option<Coordinate>,
}

/// Read the capture year and GPS position from an image file.
///
/// Returns `None` when the file carries no parseable metadata block at all
/// (no EXIF segment, unsupported container, unreadable file). `Some` with
/// empty fields means metadata exists but the wanted tags do not.
///
/// The year comes from the first of `DateTimeOriginal`, `ModifyDate`,
/// `CreateDate` whose value starts with four digits.
pub fn read_capture_info(path: &Path) -> Option<CaptureInfo> {
    let mut parser = MediaParser::new();
    let ms = match MediaSource::file_path(path) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("Cannot open {} for metadata: {e}", path.display());
            return None;
        }
    };

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return None;
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let year = [
        ExifTag::DateTimeOriginal,
        ExifTag::ModifyDate,
        ExifTag::CreateDate,
    ]
    .into_iter()
    .find_map(|tag| {
        let text = entry_to_string(exif.get(tag)?)?;
        parse_year(&text)
    });

    let coordinate = gps_info.map(|gps| Coordinate {
        latitude: latlng_to_decimal(&gps.latitude, gps.latitude_ref),
        longitude: latlng_to_decimal(&gps.longitude, gps.longitude_ref),
    });

    Some(CaptureInfo { year, coordinate })
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}

/// Extract the year from an EXIF date string.
///
/// Accepts both the classic `"YYYY:MM:DD HH:MM:SS"` form and RFC 3339
/// renderings; the leading run of digits must be exactly four long.
fn parse_year(text: &str) -> Option<i32> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    digits.parse().ok()
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    let degrees = latlng.0.0 as f64 / latlng.0.1 as f64;
    let minutes = latlng.1.0 as f64 / latlng.1.1 as f64;
    let seconds = latlng.2.0 as f64 / latlng.2.1 as f64;

    let mut coord = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference == 'S' || reference == 'W' {
        coord = -coord;
    }

    coord
}
