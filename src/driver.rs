//! Orchestrates turning one rasterised glyph mask into a distance-field
//! image ready for packing: padding the mask before the transform runs,
//! then (optionally) shrinking the result by the CLI's downsampling
//! ratio. `source_padding` (here) and `atlas_padding` (in
//! [`crate::atlas`]) are kept as two distinct named parameters rather than
//! one overloaded `padding`, since the CLI scales the former by the
//! downsampling ratio before it ever reaches the distance transform.

use crate::distance_transform::DistanceTransform;
use crate::downsample::{self, Kernel};
use crate::geometry::Vec2;
use crate::image::Image;

/// Pads a 1-bit mask by `source_padding` pixels on every side, centring
/// the original mask in a larger, cleared buffer. Gives the distance
/// transform room to grow into before the glyph is packed.
pub fn prepare_dt_input(mask: &Image, source_padding: u32) -> Image {
    if source_padding == 0 {
        return mask.clone();
    }
    let padded = Image::new(
        mask.width() + source_padding * 2,
        mask.height() + source_padding * 2,
        1,
    );
    let inner = padded.view(
        Vec2::new(source_padding, source_padding),
        Vec2::new(source_padding + mask.width(), source_padding + mask.height()),
    );
    inner
        .load(mask)
        .expect("inner view is sized to exactly match mask");
    padded
}

/// Runs `algo` over `input` (a 1-bit mask) and returns a fresh 32-bit
/// float image of the signed distance field.
pub fn run<T: DistanceTransform>(algo: &T, input: &Image) -> Image {
    let output = Image::new(input.width(), input.height(), 32);
    algo.transform(input, &output);
    output
}

/// Runs `algo` over `input`, then downsamples the result by `ratio`
/// using `kernel` (a no-op copy when `ratio == 1`). This is the glyph
/// pipeline the CLI's `atlas -d` path drives per glyph, before packing.
pub fn run_and_downsample<T: DistanceTransform>(
    algo: &T,
    input: &Image,
    ratio: u32,
    kernel: Kernel,
) -> Image {
    let full = run(algo, input);
    downsample::downsample(&full, ratio, kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance_transform::DeadReckoning;

    #[test]
    fn prepare_dt_input_centers_mask_in_a_padded_buffer() {
        let mask = Image::new(2, 2, 1);
        mask.set_pixel_bit(0, 0, true);
        mask.set_pixel_bit(1, 1, true);
        let padded = prepare_dt_input(&mask, 3);
        assert_eq!(padded.width(), 8);
        assert_eq!(padded.height(), 8);
        assert!(padded.get_pixel_bit(3, 3));
        assert!(padded.get_pixel_bit(4, 4));
        assert!(!padded.get_pixel_bit(0, 0));
    }

    #[test]
    fn zero_padding_is_a_plain_clone() {
        let mask = Image::new(3, 3, 1);
        mask.set_pixel_bit(1, 1, true);
        let same = prepare_dt_input(&mask, 0);
        assert_eq!(same.width(), 3);
        assert_eq!(same.height(), 3);
        assert!(same.get_pixel_bit(1, 1));
    }

    #[test]
    fn run_and_downsample_with_ratio_one_matches_plain_run() {
        let mask = Image::new(5, 5, 1);
        mask.set_pixel_bit(2, 2, true);
        let plain = run(&DeadReckoning, &mask);
        let via_helper = run_and_downsample(&DeadReckoning, &mask, 1, Kernel::Center);
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(plain.get_pixel_f32(x, y), via_helper.get_pixel_f32(x, y));
            }
        }
    }
}
