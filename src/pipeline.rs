//! Batch processing pipeline.
//!
//! Walks the input folder, runs every supported photo through metadata
//! extraction, caption resolution, and stamping, and reports per-photo
//! outcomes plus an aggregate summary. One bad file never aborts the run.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::exif;
use crate::geocode::Gazetteer;
use crate::locations::LocationTable;
use crate::resolver::{self, ResolvedCaption};
use crate::watermark::{self, WatermarkStyle};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "heic", "heif"];

/// Why a photo was left out of the output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file carries no parseable metadata block at all.
    NoMetadata,
    /// Metadata exists but holds no usable capture year.
    NoYear,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoMetadata => write!(f, "no metadata"),
            SkipReason::NoYear => write!(f, "no capture year"),
        }
    }
}

/// The result of processing a single photo.
///
/// Failures are captured as values rather than propagated so the batch
/// loop keeps going.
///
/// # Example
///
/// ```rust,no_run
/// # use placestamp::config::Config;
/// # use placestamp::geocode::NominatimGazetteer;
/// # use placestamp::locations::LocationTable;
/// # use placestamp::pipeline::{process_photo, PhotoOutcome};
/// # use std::path::Path;
/// # async fn example() -> anyhow::Result<()> {
/// # let config = Config::default();
/// # let gazetteer = NominatimGazetteer::new(&config.geocoding)?;
/// # let table = LocationTable::default();
/// let outcome = process_photo(
///     Path::new("photo.jpg"),
///     Path::new("watermarked_photos"),
///     &table,
///     &gazetteer,
///     Path::new("/Library/Fonts/Arial.ttf"),
///     &config,
/// )
/// .await;
///
/// if let PhotoOutcome::Saved { output, caption } = outcome {
///     println!("{} -> {}", caption.text, output.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum PhotoOutcome {
    /// Stamped and written to the output folder.
    Saved {
        output: PathBuf,
        caption: ResolvedCaption,
    },
    /// Deliberately not processed.
    Skipped { reason: SkipReason },
    /// Decoding, rendering, or writing failed.
    Failed { error: String },
}

/// Counts aggregated over one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Collect supported photos from `dir`, non-recursively, sorted by file
/// name so processing order is stable across platforms.
pub fn collect_photos(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input folder {}", dir.display()))?;

    let mut photos = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            photos.push(path);
        }
    }
    photos.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(photos)
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_heif(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref(),
        Some("heic" | "heif")
    )
}

/// Output file name for a photo. Names pass through unchanged except for
/// HEIC/HEIF, whose stamped copies are re-encoded as JPEG.
pub fn output_file_name(path: &Path) -> PathBuf {
    let name = PathBuf::from(path.file_name().unwrap_or_default());
    if is_heif(path) { name.with_extension("jpg") } else { name }
}

/// Decode a photo into pixels. HEIC/HEIF route through libheif when the
/// `heif` feature is enabled; everything else goes through `image`.
fn decode_image(path: &Path) -> Result<DynamicImage> {
    if is_heif(path) {
        return decode_heif(path);
    }
    image::open(path).with_context(|| format!("Failed to decode {}", path.display()))
}

#[cfg(feature = "heif")]
fn decode_heif(path: &Path) -> Result<DynamicImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();
    let path_str = path
        .to_str()
        .with_context(|| format!("Non-UTF-8 path {}", path.display()))?;
    let ctx = HeifContext::read_from_file(path_str)
        .with_context(|| format!("Failed to read HEIF container {}", path.display()))?;
    let handle = ctx
        .primary_image_handle()
        .context("HEIF container has no primary image")?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let plane = decoded
        .planes()
        .interleaved
        .context("HEIF decode produced no interleaved plane")?;

    // Rows are stride-padded; copy them out pixel by pixel.
    let (width, height) = (plane.width, plane.height);
    let mut rgb = image::RgbImage::new(width, height);
    for (y, row) in plane.data.chunks(plane.stride).take(height as usize).enumerate() {
        for x in 0..width as usize {
            let i = x * 3;
            rgb.put_pixel(
                x as u32,
                y as u32,
                image::Rgb([row[i], row[i + 1], row[i + 2]]),
            );
        }
    }
    Ok(DynamicImage::ImageRgb8(rgb))
}

#[cfg(not(feature = "heif"))]
fn decode_heif(path: &Path) -> Result<DynamicImage> {
    anyhow::bail!(
        "Cannot decode {}: HEIC support requires building with the `heif` feature",
        path.display()
    )
}

/// Write the stamped image. JPEG goes through an explicit encoder so the
/// quality is controllable; other formats use the extension-driven writer.
fn save_image(image: &DynamicImage, path: &Path, jpeg_quality: u8) -> Result<()> {
    let is_jpeg = matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref(),
        Some("jpg" | "jpeg")
    );

    if is_jpeg {
        let rgb = image.to_rgb8();
        let output = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let encoder = JpegEncoder::new_with_quality(output, jpeg_quality);
        encoder
            .write_image(
                &rgb,
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .with_context(|| format!("Failed to encode {}", path.display()))?;
        return Ok(());
    }

    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Process one photo end to end: extract metadata, resolve the caption,
/// stamp it, and write the result into `out_dir`.
pub async fn process_photo(
    path: &Path,
    out_dir: &Path,
    table: &LocationTable,
    gazetteer: &dyn Gazetteer,
    font_path: &Path,
    config: &Config,
) -> PhotoOutcome {
    let Some(info) = exif::read_capture_info(path) else {
        log::warn!("  No metadata in {}, skipping", path.display());
        return PhotoOutcome::Skipped {
            reason: SkipReason::NoMetadata,
        };
    };
    let Some(year) = info.year else {
        log::warn!("  No capture year in {}, skipping", path.display());
        return PhotoOutcome::Skipped {
            reason: SkipReason::NoYear,
        };
    };

    let caption = resolver::resolve_caption(year, info.coordinate, table, gazetteer).await;
    log::info!("  Caption \"{}\" ({})", caption.text, caption.source);

    match stamp_and_save(path, out_dir, &caption.text, font_path, config) {
        Ok(output) => PhotoOutcome::Saved { output, caption },
        Err(e) => {
            log::error!("  {e:#}");
            PhotoOutcome::Failed {
                error: format!("{e:#}"),
            }
        }
    }
}

/// The fallible tail of processing: decode, stamp, write.
fn stamp_and_save(
    path: &Path,
    out_dir: &Path,
    text: &str,
    font_path: &Path,
    config: &Config,
) -> Result<PathBuf> {
    let image = decode_image(path)?;
    let stamped = watermark::draw_caption(&image, text, font_path, &WatermarkStyle::default())?;
    let output = out_dir.join(output_file_name(path));
    save_image(&stamped, &output, config.rendering.jpeg_quality)?;
    Ok(output)
}

/// Run the whole batch: collect photos from `input_dir`, process each in
/// turn, and return the aggregate counts.
///
/// The output folder is created up front. Geocoding calls made along the
/// way are paced by the gazetteer itself.
pub async fn run_batch(
    input_dir: &Path,
    out_dir: &Path,
    table: &LocationTable,
    gazetteer: &dyn Gazetteer,
    font_path: &Path,
    config: &Config,
) -> Result<BatchSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output folder {}", out_dir.display()))?;

    let photos = collect_photos(input_dir)?;
    let mut summary = BatchSummary {
        total: photos.len(),
        ..Default::default()
    };

    if photos.is_empty() {
        log::warn!("No supported image files in {}", input_dir.display());
        return Ok(summary);
    }

    for (i, photo) in photos.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, summary.total, photo.display());

        match process_photo(photo, out_dir, table, gazetteer, font_path, config).await {
            PhotoOutcome::Saved { output, .. } => {
                log::info!("  Saved: {}", output.display());
                summary.saved += 1;
            }
            PhotoOutcome::Skipped { .. } => summary.skipped += 1,
            PhotoOutcome::Failed { .. } => summary.failed += 1,
        }
    }

    log::info!(
        "Done: {} stamped, {} skipped, {} failed out of {} photos",
        summary.saved,
        summary.skipped,
        summary.failed,
        summary.total
    );
    Ok(summary)
}
