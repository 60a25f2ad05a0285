//! Rectangle packing: arranging a set of glyph-sized rectangles inside an
//! atlas, either growing the atlas to fit (flexible) or failing if it
//! doesn't (fixed-size).

pub mod maxrects;
pub mod shelf;

pub use maxrects::MaxRectsPacker;
pub use shelf::ShelfPacker;

use crate::geometry::{Rect, Vec2};

/// The outcome of packing a list of rectangle sizes: the chosen atlas
/// size, and one placed `Rect` per input size, in the same order. An
/// empty `rects` with a non-empty input signals that a fixed-size pack
/// failed to fit everything.
#[derive(Clone, Debug, Default)]
pub struct Packing {
    pub atlas_size: Vec2<u32>,
    pub rects: Vec<Rect<u32>>,
}

/// A packing strategy that places rectangles one at a time into a
/// growing or fixed atlas.
pub trait Packer {
    fn new(initial_atlas_size: Vec2<u32>, allow_rotations: bool, allow_growth: bool) -> Self;
    fn atlas_size(&self) -> Vec2<u32>;
    /// Attempts to place `rect`, writing its chosen position (and, if
    /// rotated, its swapped size) back into `rect`. Returns `false` if
    /// the rectangle doesn't fit and growth is disabled or exhausted.
    fn pack(&mut self, rect: &mut Rect<u32>) -> bool;
}

/// The smallest integer `x` such that `num <= 2^x`. `ceil_log2(0) == 0`,
/// `ceil_log2(1) == 0`.
pub fn ceil_log2(num: u64) -> u32 {
    if num <= 1 {
        return 0;
    }
    64 - (num - 1).leading_zeros()
}

/// Chooses an initial atlas size close to square whose area is the
/// smallest power of two at least as large as the rectangles' total
/// area, while still being able to fit each rectangle's longest side.
pub fn predict_atlas_size(sizes: &[Vec2<u32>]) -> Vec2<u32> {
    let mut area_sum: u64 = 0;
    let mut max_w = 0u32;
    let mut max_h = 0u32;
    for size in sizes {
        area_sum += size.x as u64 * size.y as u64;
        max_w = max_w.max(size.x);
        max_h = max_h.max(size.y);
    }

    let area_exponent = ceil_log2(area_sum);
    let mut height_exponent = area_exponent / 2;
    let mut width_exponent = area_exponent - height_exponent;
    let min_width_exponent = ceil_log2(max_w as u64);
    let min_height_exponent = ceil_log2(max_h as u64);

    if width_exponent < min_width_exponent {
        width_exponent = min_width_exponent;
        height_exponent = min_height_exponent.max(area_exponent.saturating_sub(width_exponent));
    } else if height_exponent < min_height_exponent {
        height_exponent = min_height_exponent;
        width_exponent = min_width_exponent.max(area_exponent.saturating_sub(height_exponent));
    }

    Vec2::new(1u32 << width_exponent, 1u32 << height_exponent)
}

fn init_rects(sizes: &[Vec2<u32>]) -> Vec<Rect<u32>> {
    sizes.iter().map(|&size| Rect::new(Vec2::new(0, 0), size)).collect()
}

/// Packs `sizes` into an atlas whose initial size is predicted from
/// their total area, growing it as needed. Always succeeds.
pub fn pack_flexible<P: Packer>(sizes: &[Vec2<u32>], allow_rotations: bool) -> Packing {
    let atlas_size = predict_atlas_size(sizes);
    let mut rects = init_rects(sizes);
    let mut packer = P::new(atlas_size, allow_rotations, true);
    for rect in &mut rects {
        let fit = packer.pack(rect);
        assert!(fit, "predicted atlas size must always be sufficient");
    }
    Packing { atlas_size: packer.atlas_size(), rects }
}

/// Packs `sizes` into a fixed-size atlas. If any rectangle doesn't fit,
/// `rects` is empty in the returned `Packing`.
pub fn pack_fixed<P: Packer>(sizes: &[Vec2<u32>], atlas_size: Vec2<u32>, allow_rotations: bool) -> Packing {
    let mut rects = init_rects(sizes);
    let mut packer = P::new(atlas_size, allow_rotations, false);
    for rect in &mut rects {
        if !packer.pack(rect) {
            return Packing { atlas_size, rects: Vec::new() };
        }
    }
    Packing { atlas_size, rects }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_log2_edge_cases() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(1023), 10);
        assert_eq!(ceil_log2(1024), 10);
        assert_eq!(ceil_log2(1025), 11);
    }

    #[test]
    fn predicted_size_fits_largest_rect() {
        let sizes = vec![Vec2::new(500, 10), Vec2::new(10, 10)];
        let size = predict_atlas_size(&sizes);
        assert!(size.x >= 500);
        assert!(size.y >= 10);
    }
}
