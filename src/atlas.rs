//! Composes packed glyph images into a single atlas `Image`, either as a
//! raw bitmap or as a distance field produced in place by a
//! [`DistanceTransform`](crate::distance_transform::DistanceTransform).

use crate::distance_transform::{DistanceTransform, BACKGROUND_DISTANCE};
use crate::error::{AtlasError, Result};
use crate::geometry::Vec2;
use crate::image::Image;
use crate::packing::Packing;

/// Lays `inputs` into a fresh `bit_depth` atlas at the positions given by
/// `packing`, contracting each placement rect by `padding` pixels on
/// every side before copying.
pub fn compose_bitmap_atlas(inputs: &[Image], packing: &Packing, padding: u32, bit_depth: u8) -> Result<Image> {
    if inputs.len() != packing.rects.len() {
        return Err(AtlasError::Argument(format!(
            "{} images but {} packed rects",
            inputs.len(),
            packing.rects.len()
        )));
    }

    let atlas = Image::new(packing.atlas_size.x, packing.atlas_size.y, bit_depth);
    atlas.clear();

    for (input, rect) in inputs.iter().zip(&packing.rects) {
        let view = atlas.view_padded(rect.position, rect.max(), padding);
        view.load(input)?;
    }
    Ok(atlas)
}

/// Lays `inputs` (1-bit masks, already padded) into a fresh 32-bit float
/// atlas, running `algo` on each placement rect to produce the signed
/// distance field directly in the atlas buffer.
pub fn compose_distance_field_atlas<T: DistanceTransform>(
    inputs: &[Image],
    packing: &Packing,
    algo: &T,
) -> Result<Image> {
    if inputs.len() != packing.rects.len() {
        return Err(AtlasError::Argument(format!(
            "{} images but {} packed rects",
            inputs.len(),
            packing.rects.len()
        )));
    }

    let atlas = Image::new(packing.atlas_size.x, packing.atlas_size.y, 32);
    atlas.fill_rect(Vec2::new(0, 0), atlas.size(), BACKGROUND_DISTANCE.to_bits());

    for (input, rect) in inputs.iter().zip(&packing.rects) {
        let output = atlas.view(rect.position, rect.max());
        algo.transform(input, &output);
    }
    Ok(atlas)
}

/// Lays out already-computed per-glyph 32-bit float distance fields
/// (e.g. run through [`crate::driver::run_and_downsample`]) into a fresh
/// atlas, without running a transform in place. Used by the CLI's
/// `atlas -d` path once downsampling has made each glyph's field a
/// different size than its un-downsampled mask, so `compose_distance_field_atlas`'s
/// assumption that `Algo` can run directly at the packed rect's size no
/// longer holds.
pub fn compose_prepared_distance_field_atlas(inputs: &[Image], packing: &Packing) -> Result<Image> {
    if inputs.len() != packing.rects.len() {
        return Err(AtlasError::Argument(format!(
            "{} images but {} packed rects",
            inputs.len(),
            packing.rects.len()
        )));
    }

    let atlas = Image::new(packing.atlas_size.x, packing.atlas_size.y, 32);
    atlas.fill_rect(Vec2::new(0, 0), atlas.size(), BACKGROUND_DISTANCE.to_bits());

    for (input, rect) in inputs.iter().zip(&packing.rects) {
        let view = atlas.view(rect.position, rect.max());
        view.load(input)?;
    }
    Ok(atlas)
}
