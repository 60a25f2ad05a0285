//! Shelf Next-Fit: an O(n) packer that places rectangles left-to-right in
//! horizontal bands ("shelves"), opening a new shelf when the current one
//! runs out of width.

use crate::geometry::{Rect, Vec2};

use super::{ceil_log2, Packer};

pub struct ShelfPacker {
    atlas_size: Vec2<u32>,
    allow_rotations: bool,
    allow_growth: bool,
    current_shelf_size: Vec2<u32>,
    used_height: u32,
}

fn ceil_div(dividend: u32, divisor: u32) -> u32 {
    (dividend + divisor - 1) / divisor
}

impl ShelfPacker {
    /// Sort key ("DESCLS", longest side descending) a caller can pass to
    /// `slice::sort_by_key` before packing for better first-fit-decreasing
    /// quality. `pack` itself never sorts its input.
    pub fn input_sorting_key(size: Vec2<u32>) -> std::cmp::Reverse<(u32, u32)> {
        std::cmp::Reverse((size.x.max(size.y), size.x.min(size.y)))
    }
}

impl ShelfPacker {
    fn open_new_shelf(&mut self) {
        self.used_height += self.current_shelf_size.y;
        self.current_shelf_size = Vec2::new(0, 0);
    }

    fn place(&mut self, rect: &mut Rect<u32>) {
        rect.position = Vec2::new(self.current_shelf_size.x, self.used_height);
        self.current_shelf_size.x += rect.size.x;
        self.current_shelf_size.y = self.current_shelf_size.y.max(rect.size.y);
    }

    fn place_maybe_grow(&mut self, rect: &mut Rect<u32>) -> bool {
        if self.used_height + rect.size.y > self.atlas_size.y {
            if self.allow_growth {
                let final_height = self.used_height + rect.size.y;
                let num_doublings = ceil_log2(ceil_div(final_height, self.atlas_size.y) as u64);
                self.atlas_size.y <<= num_doublings;
            } else {
                return false;
            }
        }
        self.place(rect);
        true
    }

    fn pack_no_rotations(&mut self, rect: &mut Rect<u32>) -> bool {
        if self.current_shelf_size.x + rect.size.x > self.atlas_size.x {
            self.open_new_shelf();
            if rect.size.x > self.atlas_size.x {
                return false;
            }
        }
        self.place_maybe_grow(rect)
    }

    fn pack_with_rotations(&mut self, rect: &mut Rect<u32>) -> bool {
        let (min_side, max_side) = (rect.size.x.min(rect.size.y), rect.size.x.max(rect.size.y));
        let remaining_width = self.atlas_size.x - self.current_shelf_size.x;
        let remaining_height = self.atlas_size.y.saturating_sub(self.used_height);

        if self.current_shelf_size.y >= max_side && remaining_width >= min_side {
            rect.size = Vec2::new(min_side, max_side);
            self.place(rect);
        } else if remaining_width >= max_side && remaining_height >= min_side {
            rect.size = Vec2::new(max_side, min_side);
            self.place(rect);
        } else {
            self.open_new_shelf();
            rect.size = if max_side > self.atlas_size.x {
                Vec2::new(min_side, max_side)
            } else {
                Vec2::new(max_side, min_side)
            };
            return self.place_maybe_grow(rect);
        }
        true
    }
}

impl Packer for ShelfPacker {
    fn new(initial_atlas_size: Vec2<u32>, allow_rotations: bool, allow_growth: bool) -> Self {
        ShelfPacker {
            atlas_size: initial_atlas_size,
            allow_rotations,
            allow_growth,
            current_shelf_size: Vec2::new(0, 0),
            used_height: 0,
        }
    }

    fn atlas_size(&self) -> Vec2<u32> {
        self.atlas_size
    }

    fn pack(&mut self, rect: &mut Rect<u32>) -> bool {
        if self.allow_rotations {
            self.pack_with_rotations(rect)
        } else {
            self.pack_no_rotations(rect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::{pack_fixed, pack_flexible};

    #[test]
    fn rejects_rect_wider_than_fixed_atlas() {
        let sizes = vec![Vec2::new(20, 5)];
        let packing = pack_fixed::<ShelfPacker>(&sizes, Vec2::new(10, 10), false);
        assert!(packing.rects.is_empty());
    }

    #[test]
    fn rejects_rect_taller_than_fixed_atlas_without_growth() {
        let sizes = vec![Vec2::new(5, 5), Vec2::new(5, 5), Vec2::new(5, 5)];
        let packing = pack_fixed::<ShelfPacker>(&sizes, Vec2::new(10, 8), false);
        assert!(packing.rects.is_empty());
    }

    #[test]
    fn rotation_fits_a_rect_that_would_otherwise_overflow() {
        let sizes = vec![Vec2::new(9, 3)];
        let packing = pack_fixed::<ShelfPacker>(&sizes, Vec2::new(4, 10), true);
        assert_eq!(packing.rects.len(), 1);
        assert_eq!(packing.rects[0].size, Vec2::new(3, 9));
    }

    #[test]
    fn accepts_exactly_atlas_sized_rect() {
        let sizes = vec![Vec2::new(16, 16)];
        let packing = pack_fixed::<ShelfPacker>(&sizes, Vec2::new(16, 16), false);
        assert_eq!(packing.rects.len(), 1);
        assert_eq!(packing.rects[0].position, Vec2::new(0, 0));
    }

    #[test]
    fn placements_are_disjoint_and_complete() {
        let sizes: Vec<Vec2<u32>> = (1..20).map(|i| Vec2::new(i % 7 + 1, i % 5 + 1)).collect();
        let packing = pack_flexible::<ShelfPacker>(&sizes, false);
        assert_eq!(packing.rects.len(), sizes.len());
        for (i, a) in packing.rects.iter().enumerate() {
            assert_eq!(a.size, sizes[i]);
            let a_max = a.max();
            assert!(a_max.x <= packing.atlas_size.x && a_max.y <= packing.atlas_size.y);
            for b in packing.rects.iter().skip(i + 1) {
                let b_max = b.max();
                let disjoint = a_max.x <= b.position.x
                    || b_max.x <= a.position.x
                    || a_max.y <= b.position.y
                    || b_max.y <= a.position.y;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn flexible_packing_grows_to_fit_many_tiny_rects() {
        let sizes: Vec<Vec2<u32>> = (0..64).map(|_| Vec2::new(3, 3)).collect();
        let packing = pack_flexible::<ShelfPacker>(&sizes, false);
        assert_eq!(packing.rects.len(), 64);
    }

    #[test]
    fn input_sorting_key_orders_longest_side_descending() {
        let mut sizes = vec![Vec2::new(2, 2), Vec2::new(9, 1), Vec2::new(5, 4)];
        sizes.sort_by_key(|&s| ShelfPacker::input_sorting_key(s));
        assert_eq!(sizes, vec![Vec2::new(9, 1), Vec2::new(5, 4), Vec2::new(2, 2)]);
    }
}
