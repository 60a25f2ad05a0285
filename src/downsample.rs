//! Shrinks a rasterised or distance-transformed `Image` by an integer
//! ratio, for callers who rasterise glyphs larger than the final atlas
//! resolution to get finer gradients out of the distance transform.

use crate::geometry::Vec2;
use crate::image::Image;

/// How a `ratio`×`ratio` block of source pixels collapses into one
/// output pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// The single pixel nearest the block's centre.
    Center,
    /// The arithmetic mean of the block.
    Average,
    /// The minimum value in the block (keeps thin foreground strokes
    /// from being averaged away in a distance field).
    Min,
}

impl Kernel {
    pub fn parse(name: &str) -> Option<Kernel> {
        match name {
            "center" => Some(Kernel::Center),
            "average" => Some(Kernel::Average),
            "min" => Some(Kernel::Min),
            _ => None,
        }
    }
}

/// Downsamples a 32-bit float `Image` (e.g. a signed distance field) by
/// `ratio`, rounding the output size down. `ratio == 1` is a plain copy.
pub fn downsample(input: &Image, ratio: u32, kernel: Kernel) -> Image {
    assert_eq!(input.bit_depth(), 32, "downsampling operates on 32-bit float images");
    assert!(ratio >= 1, "downsampling ratio must be at least 1");

    let out_width = input.width() / ratio;
    let out_height = input.height() / ratio;
    let output = Image::new(out_width.max(1), out_height.max(1), 32);

    for oy in 0..output.height() {
        for ox in 0..output.width() {
            let value = match kernel {
                Kernel::Center => center_value(input, ox, oy, ratio),
                Kernel::Average => average_value(input, ox, oy, ratio),
                Kernel::Min => min_value(input, ox, oy, ratio),
            };
            output.set_pixel_f32(ox, oy, value);
        }
    }
    output
}

fn center_value(input: &Image, ox: u32, oy: u32, ratio: u32) -> f32 {
    let cx = ox * ratio + ratio / 2;
    let cy = oy * ratio + ratio / 2;
    input.get_pixel_f32(cx.min(input.width() - 1), cy.min(input.height() - 1))
}

fn average_value(input: &Image, ox: u32, oy: u32, ratio: u32) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for dy in 0..ratio {
        let y = oy * ratio + dy;
        if y >= input.height() {
            continue;
        }
        for dx in 0..ratio {
            let x = ox * ratio + dx;
            if x >= input.width() {
                continue;
            }
            sum += input.get_pixel_f32(x, y);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

fn min_value(input: &Image, ox: u32, oy: u32, ratio: u32) -> f32 {
    let mut best = f32::INFINITY;
    for dy in 0..ratio {
        let y = oy * ratio + dy;
        if y >= input.height() {
            continue;
        }
        for dx in 0..ratio {
            let x = ox * ratio + dx;
            if x >= input.width() {
                continue;
            }
            best = best.min(input.get_pixel_f32(x, y));
        }
    }
    if best.is_finite() {
        best
    } else {
        0.0
    }
}

/// Scales an already-packed-at-full-resolution size list down by `ratio`,
/// the way the CLI sizes its rects before handing them to the packer.
pub fn scale_sizes(sizes: &[Vec2<u32>], ratio: u32) -> Vec<Vec2<u32>> {
    sizes.iter().map(|s| Vec2::new((s.x / ratio).max(1), (s.y / ratio).max(1))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, value: f32) -> Image {
        let img = Image::new(width, height, 32);
        img.fill_rect(Vec2::new(0, 0), Vec2::new(width, height), value.to_bits());
        img
    }

    #[test]
    fn ratio_one_is_a_plain_copy() {
        let input = filled(4, 4, 3.5);
        let output = downsample(&input, 1, Kernel::Average);
        assert_eq!(output.width(), 4);
        assert_eq!(output.height(), 4);
        assert_eq!(output.get_pixel_f32(2, 2), 3.5);
    }

    #[test]
    fn average_kernel_averages_the_block() {
        let input = Image::new(2, 2, 32);
        input.set_pixel_f32(0, 0, 0.0);
        input.set_pixel_f32(1, 0, 10.0);
        input.set_pixel_f32(0, 1, 20.0);
        input.set_pixel_f32(1, 1, 30.0);
        let output = downsample(&input, 2, Kernel::Average);
        assert_eq!(output.width(), 1);
        assert_eq!(output.get_pixel_f32(0, 0), 15.0);
    }

    #[test]
    fn min_kernel_keeps_the_most_negative_value() {
        let input = Image::new(2, 2, 32);
        input.set_pixel_f32(0, 0, -1.0);
        input.set_pixel_f32(1, 0, 5.0);
        input.set_pixel_f32(0, 1, 2.0);
        input.set_pixel_f32(1, 1, 3.0);
        let output = downsample(&input, 2, Kernel::Min);
        assert_eq!(output.get_pixel_f32(0, 0), -1.0);
    }

    #[test]
    fn center_kernel_picks_block_center_pixel() {
        let input = Image::new(3, 3, 32);
        for y in 0..3 {
            for x in 0..3 {
                input.set_pixel_f32(x, y, (y * 3 + x) as f32);
            }
        }
        let output = downsample(&input, 3, Kernel::Center);
        assert_eq!(output.width(), 1);
        assert_eq!(output.get_pixel_f32(0, 0), input.get_pixel_f32(1, 1));
    }

    #[test]
    fn scale_sizes_divides_and_floors_at_one() {
        let sizes = vec![Vec2::new(10, 10), Vec2::new(3, 3)];
        let scaled = scale_sizes(&sizes, 4);
        assert_eq!(scaled[0], Vec2::new(2, 2));
        assert_eq!(scaled[1], Vec2::new(1, 1));
    }
}
