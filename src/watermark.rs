use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{DynamicImage, Rgba};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};

/// Caption layout and styling, expressed relative to image dimensions so
/// the stamp scales with the photo.
#[derive(Debug, Clone)]
pub struct WatermarkStyle {
    /// Font size as a fraction of image height.
    pub font_scale: f32,
    /// Margin from the left and bottom edges as a fraction of image width.
    pub margin_scale: f32,
    /// Outline thickness in pixels; every offset within this radius is
    /// painted black before the fill.
    pub outline_radius: i32,
    /// Drop shadow offset in pixels, down and to the right.
    pub shadow_offset: i32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_scale: 0.04,
            margin_scale: 0.02,
            outline_radius: 4,
            shadow_offset: 5,
        }
    }
}

/// Pick the caption font: the explicit path when given, otherwise the first
/// candidate that exists on this system.
pub fn resolve_font_path(explicit: Option<&Path>, candidates: &[String]) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        anyhow::bail!("Font file not found: {}", path.display());
    }

    for candidate in candidates {
        let candidate = Path::new(candidate);
        if candidate.exists() {
            log::debug!("Using font {}", candidate.display());
            return Ok(candidate.to_path_buf());
        }
    }
    anyhow::bail!("No usable font found on this system; pass one with --font")
}

/// Draw the caption in the bottom-left corner of the image.
///
/// The text is painted in three passes — drop shadow, black outline ring,
/// white fill — so it stays readable on any background. The font file is
/// read and parsed per call.
pub fn draw_caption(
    image: &DynamicImage,
    text: &str,
    font_path: &Path,
    style: &WatermarkStyle,
) -> Result<DynamicImage> {
    let mut rgba = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let font_data = std::fs::read(font_path)
        .with_context(|| format!("Failed to read font {}", font_path.display()))?;
    let font = FontVec::try_from_vec(font_data)
        .with_context(|| format!("Failed to parse font {}", font_path.display()))?;

    let scale = PxScale::from((height as f32 * style.font_scale).max(1.0));
    let margin = (width as f32 * style.margin_scale) as i32;

    let (_, text_height) = text_size(scale, &font, text);
    let x = margin;
    let y = height as i32 - text_height as i32 - margin - 10;

    let black = Rgba([0u8, 0, 0, 255]);
    let white = Rgba([255u8, 255, 255, 255]);

    // Drop shadow
    draw_text_mut(
        &mut rgba,
        black,
        x + style.shadow_offset,
        y + style.shadow_offset,
        scale,
        &font,
        text,
    );

    // Outline ring
    for dx in -style.outline_radius..=style.outline_radius {
        for dy in -style.outline_radius..=style.outline_radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text_mut(&mut rgba, black, x + dx, y + dy, scale, &font, text);
        }
    }

    // Fill on top
    draw_text_mut(&mut rgba, white, x, y, scale, &font, text);

    Ok(DynamicImage::ImageRgba8(rgba))
}
