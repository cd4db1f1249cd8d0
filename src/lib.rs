//! # placestamp
//!
//! Batch photo watermarker — stamp each photo with where and when it was
//! taken ("2019, Lisbon"), derived from EXIF capture data, reverse
//! geocoding, and a user-maintained year/place table.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module,
//! which handles the full extract → resolve → stamp → save flow:
//!
//! ```rust,no_run
//! use placestamp::config::Config;
//! use placestamp::geocode::NominatimGazetteer;
//! use placestamp::locations::LocationTable;
//! use placestamp::pipeline::run_batch;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load config (geocoding endpoint, JPEG quality, font candidates)
//!     let config = Config::load(None)?;
//!
//!     // Optional "year,place" overrides, one per line
//!     let table = LocationTable::load(Path::new("locations.txt"));
//!
//!     // Nominatim-backed lookups, rate-limited per their usage policy
//!     let gazetteer = NominatimGazetteer::new(&config.geocoding)?;
//!
//!     let summary = run_batch(
//!         Path::new("./photos"),
//!         Path::new("./watermarked_photos"),
//!         &table,
//!         &gazetteer,
//!         Path::new("/Library/Fonts/Arial.ttf"),
//!         &config,
//!     )
//!     .await?;
//!
//!     println!("{} stamped, {} skipped", summary.saved, summary.skipped);
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! For more control, the extraction, resolution, and rendering steps can
//! be called individually:
//!
//! ```rust,no_run
//! use placestamp::config::Config;
//! use placestamp::exif::read_capture_info;
//! use placestamp::geocode::NominatimGazetteer;
//! use placestamp::locations::LocationTable;
//! use placestamp::resolver::resolve_caption;
//! use placestamp::watermark::{draw_caption, WatermarkStyle};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     // 1. Pull the capture year and GPS position out of the EXIF block
//!     let info = read_capture_info(path).unwrap_or_default();
//!     let Some(year) = info.year else {
//!         println!("No capture year; nothing to stamp");
//!         return Ok(());
//!     };
//!
//!     // 2. Resolve the caption text
//!     let config = Config::default();
//!     let table = LocationTable::load(Path::new("locations.txt"));
//!     let gazetteer = NominatimGazetteer::new(&config.geocoding)?;
//!     let caption = resolve_caption(year, info.coordinate, &table, &gazetteer).await;
//!     println!("Caption: {} ({})", caption.text, caption.source);
//!
//!     // 3. Stamp it onto the pixels
//!     let image = image::open(path)?;
//!     let stamped = draw_caption(
//!         &image,
//!         &caption.text,
//!         Path::new("/Library/Fonts/Arial.ttf"),
//!         &WatermarkStyle::default(),
//!     )?;
//!     stamped.save("stamped.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Caption Resolution
//!
//! Every photo with a capture year gets exactly one caption, picked in
//! this order:
//!
//! | Priority | Source | Caption |
//! |----------|--------|---------|
//! | 1 | Year matched a table row | `"2019, Lisbon"` |
//! | 2 | GPS reverse-geocoded to a locality | `"2019, Paris"` |
//! | 3 | Neither | `"2019"` |
//!
//! When several table rows share the year, the photo's GPS position picks
//! the nearest one; without GPS the first row wins.
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`exif`] — Capture year and GPS extraction from image metadata
//! - [`geocode`] — Coordinates, the [`geocode::Gazetteer`] trait, and the Nominatim client
//! - [`locations`] — The "year,place" override table
//! - [`pipeline`] — High-level batch pipeline, photo collection, decoding and saving
//! - [`resolver`] — Caption resolution combining the table and the gazetteer
//! - [`watermark`] — Font lookup and text rendering

pub mod config;
pub mod exif;
pub mod geocode;
pub mod locations;
pub mod pipeline;
pub mod resolver;
pub mod watermark;

#[cfg(test)]
pub(crate) mod testutil;
