//! MaxRects: maintains the list of maximal free rectangles remaining in
//! the atlas and places each new rectangle into the free rect it fits
//! best (Best Short-Side Fit).

use crate::geometry::{Rect, Vec2};

use super::Packer;

pub struct MaxRectsPacker {
    atlas_size: Vec2<u32>,
    allow_rotations: bool,
    allow_growth: bool,
    free_list: Vec<Rect<u32>>,
}

fn can_contain(free: &Rect<u32>, to_be_placed: &Rect<u32>) -> bool {
    free.size.x >= to_be_placed.size.x && free.size.y >= to_be_placed.size.y
}

/// Best Short-Side Fit: the smaller of the two leftover margins were
/// `to_be_placed` dropped into `free`'s corner. `u32::MAX` if it doesn't
/// fit at all.
fn bssf_score(free: &Rect<u32>, to_be_placed: &Rect<u32>) -> u32 {
    if !can_contain(free, to_be_placed) {
        return u32::MAX;
    }
    let dx = free.size.x - to_be_placed.size.x;
    let dy = free.size.y - to_be_placed.size.y;
    dx.min(dy)
}

fn in_range(v: u32, min: u32, max: u32) -> bool {
    v > min && v < max
}

/// Subtracts `bbox` from `rect`, returning the maximal rectangles that
/// remain. A rect untouched by `bbox` is returned unchanged; a rect
/// wholly inside `bbox` disappears (empty result).
fn crop_free_rect(rect: &Rect<u32>, bbox: &Rect<u32>) -> Vec<Rect<u32>> {
    let rect_min = rect.position;
    let rect_max = rect.max();
    let bbox_min = bbox.position;
    let bbox_max = bbox.max();

    let overlaps = bbox_min.x < rect_max.x
        && bbox_max.x > rect_min.x
        && bbox_min.y < rect_max.y
        && bbox_max.y > rect_min.y;
    if !overlaps {
        return vec![*rect];
    }
    if bbox.contains(rect) {
        return Vec::new();
    }

    let mut pieces = Vec::with_capacity(4);
    if in_range(bbox_min.y, rect_min.y, rect_max.y) {
        pieces.push(Rect::new(rect_min, Vec2::new(rect.size.x, bbox_min.y - rect_min.y)));
    }
    if in_range(bbox_max.y, rect_min.y, rect_max.y) {
        pieces.push(Rect::new(
            Vec2::new(rect_min.x, bbox_max.y),
            Vec2::new(rect.size.x, rect_max.y - bbox_max.y),
        ));
    }
    if in_range(bbox_min.x, rect_min.x, rect_max.x) {
        pieces.push(Rect::new(rect_min, Vec2::new(bbox_min.x - rect_min.x, rect.size.y)));
    }
    if in_range(bbox_max.x, rect_min.x, rect_max.x) {
        pieces.push(Rect::new(
            Vec2::new(bbox_max.x, rect_min.y),
            Vec2::new(rect_max.x - bbox_max.x, rect.size.y),
        ));
    }
    pieces
}

/// Removes any free rect wholly contained within another.
fn prune_free_list(free_list: &mut Vec<Rect<u32>>) {
    let mut i = 0;
    while i < free_list.len() {
        let mut j = i + 1;
        let mut removed_i = false;
        while j < free_list.len() {
            if free_list[i].contains(&free_list[j]) {
                free_list.swap_remove(j);
            } else if free_list[j].contains(&free_list[i]) {
                free_list.swap_remove(i);
                removed_i = true;
                break;
            } else {
                j += 1;
            }
        }
        if !removed_i {
            i += 1;
        }
    }
}

impl MaxRectsPacker {
    /// Sort key ("DESCSS", shortest side descending) a caller can pass to
    /// `slice::sort_by_key` before packing for better packing quality.
    /// `pack` itself never sorts its input.
    pub fn input_sorting_key(size: Vec2<u32>) -> std::cmp::Reverse<(u32, u32)> {
        std::cmp::Reverse((size.x.min(size.y), size.x.max(size.y)))
    }

    fn find_free_rect(&self, rect: &Rect<u32>) -> Option<(usize, bool)> {
        let best = self
            .free_list
            .iter()
            .enumerate()
            .map(|(i, free)| (i, bssf_score(free, rect)))
            .min_by_key(|&(_, score)| score);

        if !self.allow_rotations {
            return best.filter(|&(_, score)| score != u32::MAX);
        }

        let rotated = Rect::new(rect.position, Vec2::new(rect.size.y, rect.size.x));
        let best_rotated = self
            .free_list
            .iter()
            .enumerate()
            .map(|(i, free)| (i, bssf_score(free, &rotated)))
            .min_by_key(|&(_, score)| score);

        match (best, best_rotated) {
            (Some((_, bs)), Some((ri, rs))) if rs < bs && rs != u32::MAX => Some((ri, true)),
            (Some((bi, bs)), _) if bs != u32::MAX => Some((bi, false)),
            _ => None,
        }
    }

    /// Doubles the shorter side of the atlas (height on a tie), extending
    /// every free rect that touched the far edge along that axis.
    fn grow(&mut self) {
        if self.atlas_size.x < self.atlas_size.y {
            let old_width = self.atlas_size.x;
            for free in &mut self.free_list {
                if free.position.x + free.size.x == old_width {
                    free.size.x += old_width;
                }
            }
            self.atlas_size.x *= 2;
        } else {
            let old_height = self.atlas_size.y;
            for free in &mut self.free_list {
                if free.position.y + free.size.y == old_height {
                    free.size.y += old_height;
                }
            }
            self.atlas_size.y *= 2;
        }
    }

    fn crop_and_prune(&mut self, placed: &Rect<u32>) {
        let mut new_list = Vec::with_capacity(self.free_list.len());
        for free in &self.free_list {
            new_list.extend(crop_free_rect(free, placed));
        }
        self.free_list = new_list;
        prune_free_list(&mut self.free_list);
    }
}

impl Packer for MaxRectsPacker {
    fn new(initial_atlas_size: Vec2<u32>, allow_rotations: bool, allow_growth: bool) -> Self {
        MaxRectsPacker {
            atlas_size: initial_atlas_size,
            allow_rotations,
            allow_growth,
            free_list: vec![Rect::new(Vec2::new(0, 0), initial_atlas_size)],
        }
    }

    fn atlas_size(&self) -> Vec2<u32> {
        self.atlas_size
    }

    fn pack(&mut self, rect: &mut Rect<u32>) -> bool {
        loop {
            match self.find_free_rect(rect) {
                Some((idx, rotated)) => {
                    if rotated {
                        rect.size = Vec2::new(rect.size.y, rect.size.x);
                    }
                    rect.position = self.free_list[idx].position;
                    self.crop_and_prune(rect);
                    return true;
                }
                None => {
                    if self.allow_growth {
                        self.grow();
                    } else {
                        return false;
                    }
                }
            }
        }
    }
}
