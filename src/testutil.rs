//! Shared test fixtures: tiny JPEG/PNG files with synthesized EXIF, plus
//! stand-in collaborators.

use std::path::{Path, PathBuf};

use crate::geocode::{Coordinate, Gazetteer};

/// Gazetteer that never resolves anything.
pub(crate) struct NullGazetteer;

#[async_trait::async_trait]
impl Gazetteer for NullGazetteer {
    async fn reverse_geocode(&self, _coordinate: Coordinate) -> Option<String> {
        None
    }

    async fn geocode(&self, _place: &str) -> Option<Coordinate> {
        None
    }
}

/// First font from the default search list present on this machine, if any.
/// Render-touching tests return early when there is none.
pub(crate) fn system_font() -> Option<PathBuf> {
    crate::config::RenderingConfig::default()
        .font_search_paths
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

// TIFF data formats
const FORMAT_ASCII: u16 = 2;
const FORMAT_LONG: u16 = 4;
const FORMAT_RATIONAL: u16 = 5;

// IFD0 tag IDs
const TAG_MODIFY_DATE: u16 = 0x0132;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TAG_GPS_IFD_POINTER: u16 = 0x8825;
// ExifIFD tag IDs
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
// GPS IFD tag IDs
const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
const TAG_GPS_LATITUDE: u16 = 0x0002;
const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
const TAG_GPS_LONGITUDE: u16 = 0x0004;

/// Write a small JPEG carrying the given `DateTimeOriginal` and GPS
/// position in its EXIF block.
pub(crate) fn write_jpeg_with_exif(path: &Path, date_time: Option<&str>, gps: Option<(f64, f64)>) {
    write_jpeg_with_app1(path, &build_app1_segment(date_time, None, gps));
}

/// Write a small JPEG whose only date tag is `ModifyDate`.
pub(crate) fn write_jpeg_with_modify_date(path: &Path, date_time: &str) {
    write_jpeg_with_app1(path, &build_app1_segment(None, Some(date_time), None));
}

/// Write a small JPEG with no EXIF segment at all.
pub(crate) fn write_plain_jpeg(path: &Path) {
    let img = image::RgbImage::from_pixel(64, 48, image::Rgb([90, 120, 150]));
    img.save(path).unwrap();
}

/// Write a small PNG (PNG never carries an EXIF block here).
pub(crate) fn write_plain_png(path: &Path) {
    let img = image::RgbaImage::from_pixel(64, 48, image::Rgba([40, 90, 60, 255]));
    img.save(path).unwrap();
}

/// Splice an APP1 segment into a freshly rendered JPEG, right after the
/// SOI marker.
fn write_jpeg_with_app1(path: &Path, segment: &[u8]) {
    write_plain_jpeg(path);

    let original = std::fs::read(path).unwrap();
    assert_eq!(&original[..2], &[0xFF, 0xD8]);

    let mut patched = Vec::with_capacity(original.len() + segment.len());
    patched.extend_from_slice(&original[..2]);
    patched.extend_from_slice(segment);
    patched.extend_from_slice(&original[2..]);
    std::fs::write(path, patched).unwrap();
}

/// A raw IFD entry, little-endian.
struct IfdEntry {
    tag_id: u16,
    data_format: u16, // TIFF data format (2=ASCII, 4=LONG, 5=RATIONAL)
    count: u32,
    inline_value: [u8; 4],       // value if data fits in 4 bytes
    extra_data: Option<Vec<u8>>, // data if > 4 bytes
}

fn string_entry(tag_id: u16, value: &str) -> IfdEntry {
    let mut data = value.as_bytes().to_vec();
    data.push(0); // null terminator
    let count = data.len() as u32;

    let (inline_value, extra_data) = if data.len() <= 4 {
        let mut inline = [0u8; 4];
        inline[..data.len()].copy_from_slice(&data);
        (inline, None)
    } else {
        ([0u8; 4], Some(data))
    };

    IfdEntry {
        tag_id,
        data_format: FORMAT_ASCII,
        count,
        inline_value,
        extra_data,
    }
}

fn rational_entry(tag_id: u16, data: Vec<u8>) -> IfdEntry {
    IfdEntry {
        tag_id,
        data_format: FORMAT_RATIONAL,
        count: (data.len() / 8) as u32,
        inline_value: [0u8; 4],
        extra_data: Some(data),
    }
}

fn pointer_entry(tag_id: u16, ifd_offset: u32) -> IfdEntry {
    IfdEntry {
        tag_id,
        data_format: FORMAT_LONG,
        count: 1,
        inline_value: ifd_offset.to_le_bytes(),
        extra_data: None,
    }
}

/// Entry table plus next-IFD pointer, without any out-of-line data.
fn table_size(entries: &[IfdEntry]) -> u32 {
    2 + entries.len() as u32 * 12 + 4
}

/// Serialize one IFD's entry table. Out-of-line values go into `blobs`,
/// addressed from the running TIFF offset in `blob_at`.
fn encode_ifd_table(entries: &[IfdEntry], blob_at: &mut u32, blobs: &mut Vec<u8>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(table_size(entries) as usize);
    bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());

    for entry in entries {
        let mut ib = [0u8; 12];
        ib[0..2].copy_from_slice(&entry.tag_id.to_le_bytes());
        ib[2..4].copy_from_slice(&entry.data_format.to_le_bytes());
        ib[4..8].copy_from_slice(&entry.count.to_le_bytes());
        match &entry.extra_data {
            Some(extra) => {
                ib[8..12].copy_from_slice(&blob_at.to_le_bytes());
                blobs.extend_from_slice(extra);
                *blob_at += extra.len() as u32;
            }
            None => ib[8..12].copy_from_slice(&entry.inline_value),
        }
        bytes.extend_from_slice(&ib);
    }

    bytes.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    bytes
}

/// Assemble a complete APP1 segment:
/// `[FF E1][length][Exif\0\0][TIFF header][IFD0][ExifIFD?][GPS IFD?][data]`.
///
/// `DateTimeOriginal` sits in the ExifIFD, `ModifyDate` directly in IFD0,
/// the position in a four-entry GPS IFD, as in camera output.
fn build_app1_segment(
    date_time_original: Option<&str>,
    modify_date: Option<&str>,
    gps: Option<(f64, f64)>,
) -> Vec<u8> {
    let exif_entries: Vec<IfdEntry> = date_time_original
        .map(|dt| vec![string_entry(TAG_DATE_TIME_ORIGINAL, dt)])
        .unwrap_or_default();

    let gps_entries: Vec<IfdEntry> = gps
        .map(|(latitude, longitude)| {
            let lat_ref = if latitude >= 0.0 { "N" } else { "S" };
            let lon_ref = if longitude >= 0.0 { "E" } else { "W" };
            vec![
                string_entry(TAG_GPS_LATITUDE_REF, lat_ref),
                rational_entry(TAG_GPS_LATITUDE, dms_rational_bytes(latitude.abs())),
                string_entry(TAG_GPS_LONGITUDE_REF, lon_ref),
                rational_entry(TAG_GPS_LONGITUDE, dms_rational_bytes(longitude.abs())),
            ]
        })
        .unwrap_or_default();

    // IFD0 holds ModifyDate plus pointers to the sub-IFDs, in ascending
    // tag order. Tables are laid out back to back with all out-of-line
    // data after them, so the pointer offsets follow from the entry
    // counts alone.
    let mut ifd0: Vec<IfdEntry> = Vec::new();
    if let Some(date) = modify_date {
        ifd0.push(string_entry(TAG_MODIFY_DATE, date));
    }
    let ifd0_entry_count =
        ifd0.len() + usize::from(!exif_entries.is_empty()) + usize::from(!gps_entries.is_empty());

    let exif_ifd_at = 8 + 2 + ifd0_entry_count as u32 * 12 + 4;
    let gps_ifd_at = exif_ifd_at
        + if exif_entries.is_empty() {
            0
        } else {
            table_size(&exif_entries)
        };
    let data_at = gps_ifd_at
        + if gps_entries.is_empty() {
            0
        } else {
            table_size(&gps_entries)
        };

    if !exif_entries.is_empty() {
        ifd0.push(pointer_entry(TAG_EXIF_IFD_POINTER, exif_ifd_at));
    }
    if !gps_entries.is_empty() {
        ifd0.push(pointer_entry(TAG_GPS_IFD_POINTER, gps_ifd_at));
    }

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II"); // little-endian
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD0 right after the header

    let mut blob_at = data_at;
    let mut blobs = Vec::new();
    tiff.extend_from_slice(&encode_ifd_table(&ifd0, &mut blob_at, &mut blobs));
    if !exif_entries.is_empty() {
        tiff.extend_from_slice(&encode_ifd_table(&exif_entries, &mut blob_at, &mut blobs));
    }
    if !gps_entries.is_empty() {
        tiff.extend_from_slice(&encode_ifd_table(&gps_entries, &mut blob_at, &mut blobs));
    }
    tiff.extend_from_slice(&blobs);

    // APP1 wrapper; the length field covers itself and the Exif header
    let mut segment = Vec::with_capacity(tiff.len() + 10);
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}

/// Three little-endian u32 rational pairs: deg/1, min/1, sec*10000/10000.
fn dms_rational_bytes(decimal: f64) -> Vec<u8> {
    let degrees = decimal.floor() as u32;
    let minutes = ((decimal - degrees as f64) * 60.0).floor() as u32;
    let seconds_num =
        ((decimal - degrees as f64 - minutes as f64 / 60.0) * 3600.0 * 10_000.0) as u32;

    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(&degrees.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&minutes.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&seconds_num.to_le_bytes());
    bytes.extend_from_slice(&10_000u32.to_le_bytes());
    bytes
}
