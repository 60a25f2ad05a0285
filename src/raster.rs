//! Glyph rasterisation and font discovery, delegated to `font-kit`
//! (a FreeType-like rasteriser abstraction with a built-in platform font
//! locator). Every glyph is rasterised bilevel — this crate's distance
//! transforms take 1-bit masks, not anti-aliased coverage.

use std::path::{Path, PathBuf};

use font_kit::canvas::{Canvas, Format, RasterizationOptions};
use font_kit::family_name::FamilyName;
use font_kit::hinting::HintingOptions;
use font_kit::loaders::default::Font;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::{vec2f, vec2i};

use crate::error::{AtlasError, Result};
use crate::image::Image;

/// Where to load a font from: a family name resolved through the
/// platform's installed fonts, or an explicit file on disk.
pub enum FontSource {
    Name(String),
    Path(PathBuf),
}

impl FontSource {
    pub fn load(&self) -> Result<Font> {
        match self {
            FontSource::Name(name) => SystemSource::new()
                .select_best_match(&[FamilyName::Title(name.clone())], &Properties::new())
                .map_err(|e| AtlasError::Argument(format!("no installed font matches {name:?}: {e}")))?
                .load()
                .map_err(|e| AtlasError::Decode { path: PathBuf::from(name), reason: e.to_string() }),
            FontSource::Path(path) => {
                if !path.exists() {
                    return Err(AtlasError::InputNotFound(path.clone()));
                }
                Font::from_path(path, 0)
                    .map_err(|e| AtlasError::Decode { path: path.clone(), reason: e.to_string() })
            }
        }
    }
}

/// Placement metrics that accompany a rasterised glyph mask, carried
/// through to the descriptor file's `char` line.
#[derive(Clone, Copy, Debug)]
pub struct RasterMetrics {
    /// Horizontal distance from the pen position to the mask's left edge.
    pub bearing_x: f32,
    /// Vertical distance from the baseline to the mask's top edge.
    pub bearing_y: f32,
    /// Horizontal pen advance to the next glyph.
    pub advance_x: f32,
}

/// Rasterises `code_point` at `point_size` pixels into a 1-bit mask, with
/// `padding` pixels of empty border on every side (so the distance
/// transform has room to grow into).
pub fn rasterize_glyph(font: &Font, code_point: char, point_size: f32, padding: u32) -> Result<(Image, RasterMetrics)> {
    let glyph_id = font
        .glyph_for_char(code_point)
        .ok_or_else(|| AtlasError::GlyphMissing(code_point as u32))?;

    let identity = Transform2F::from_translation(vec2f(0.0, 0.0));
    let hinting = HintingOptions::None;
    let rasterization = RasterizationOptions::Bilevel;

    let raster_rect = font
        .raster_bounds(glyph_id, point_size, identity, hinting, rasterization)
        .map_err(|e| AtlasError::Decode { path: PathBuf::from("<font>"), reason: e.to_string() })?;

    let advance = font
        .advance(glyph_id)
        .map_err(|e| AtlasError::Decode { path: PathBuf::from("<font>"), reason: e.to_string() })?;
    let advance_x = advance.x() / font.metrics().units_per_em as f32 * point_size;

    let origin = raster_rect.origin();
    let (width, height) = (raster_rect.width().max(1) as u32, raster_rect.height().max(1) as u32);
    let mut canvas = Canvas::new(vec2i(width as i32, height as i32), Format::A8);
    let glyph_transform = Transform2F::from_translation(vec2f(-(origin.x() as f32), -(origin.y() as f32)));
    font.rasterize_glyph(&mut canvas, glyph_id, point_size, glyph_transform, hinting, rasterization)
        .map_err(|e| AtlasError::Decode { path: PathBuf::from("<font>"), reason: e.to_string() })?;

    let coverage_mask = Image::mask_from_coverage(width, height, canvas.stride, &canvas.pixels);
    let padded = Image::new(width + padding * 2, height + padding * 2, 1);
    padded
        .view(crate::geometry::Vec2::new(padding, padding), crate::geometry::Vec2::new(padding + width, padding + height))
        .load(&coverage_mask)?;

    Ok((
        padded,
        RasterMetrics {
            bearing_x: origin.x() as f32,
            bearing_y: -(origin.y() as f32),
            advance_x,
        },
    ))
}

/// True if `path` looks like a font file this crate can hand directly to
/// `font-kit` (used by the CLI to validate `--fontpath` eagerly).
pub fn looks_like_font_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
        Some("ttf") | Some("otf") | Some("ttc") | Some("otc")
    )
}
