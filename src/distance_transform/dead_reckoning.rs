//! Dead Reckoning: an incremental sweep that propagates the position of
//! the nearest boundary pixel across the grid in two passes. Approximate
//! (the true nearest boundary pixel is not always found) but fast.

use std::f32::consts::SQRT_2;

use crate::geometry::Vec2;
use crate::image::Image;

use super::{euclidean_distance, DistanceTransform};

pub struct DeadReckoning;

const FORWARD: [(i32, i32, f32); 4] = [(-1, -1, SQRT_2), (0, -1, 1.0), (1, -1, SQRT_2), (-1, 0, 1.0)];
const BACKWARD: [(i32, i32, f32); 4] = [(1, 0, 1.0), (-1, 1, SQRT_2), (0, 1, 1.0), (1, 1, SQRT_2)];

fn in_bounds(x: i32, y: i32, width: i32, height: i32) -> bool {
    x >= 0 && y >= 0 && x < width && y < height
}

fn input_at_clamped(input: &Image, x: i32, y: i32, width: i32, height: i32) -> bool {
    in_bounds(x, y, width, height) && input.get_pixel_bit(x as u32, y as u32)
}

fn relax(
    input: &Image,
    output: &Image,
    pos_buffer: &mut [Vec2<i32>],
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    dist: f32,
) {
    let _ = input;
    let (tx, ty) = (x + dx, y + dy);
    if !in_bounds(tx, ty, width, height) {
        return;
    }
    let p_idx = (y as usize) * width as usize + x as usize;
    let t_idx = (ty as usize) * width as usize + tx as usize;
    let p_out = output.get_pixel_f32(x as u32, y as u32);
    let t_out = output.get_pixel_f32(tx as u32, ty as u32);
    if t_out + dist < p_out {
        let best = pos_buffer[t_idx];
        pos_buffer[p_idx] = best;
        let dist_to_best = euclidean_distance((x - best.x) as f32, (y - best.y) as f32);
        output.set_pixel_f32(x as u32, y as u32, dist_to_best);
    }
}

impl DistanceTransform for DeadReckoning {
    fn transform(&self, input: &Image, output: &Image) {
        let width = input.width();
        let height = input.height();
        assert_eq!(input.bit_depth(), 1, "dead reckoning input must be a 1-bit mask");
        assert_eq!(output.bit_depth(), 32, "dead reckoning output must be 32-bit float");
        assert_eq!((output.width(), output.height()), (width, height));

        let (w, h) = (width as i32, height as i32);
        let mut pos_buffer = vec![Vec2::new(0, 0); (width * height) as usize];
        for y in 0..h {
            for x in 0..w {
                pos_buffer[(y as usize) * width as usize + x as usize] = Vec2::new(x, y);
            }
        }

        for y in 0..h {
            for x in 0..w {
                let center = input.get_pixel_bit(x as u32, y as u32);
                let is_boundary = input_at_clamped(input, x - 1, y, w, h) != center
                    || input_at_clamped(input, x + 1, y, w, h) != center
                    || input_at_clamped(input, x, y - 1, w, h) != center
                    || input_at_clamped(input, x, y + 1, w, h) != center;
                output.set_pixel_f32(x as u32, y as u32, if is_boundary { 0.0 } else { f32::INFINITY });
            }
        }

        for y in 0..h {
            for x in 0..w {
                for &(dx, dy, dist) in &FORWARD {
                    relax(input, output, &mut pos_buffer, w, h, x, y, dx, dy, dist);
                }
            }
        }
        for y in (0..h).rev() {
            for x in (0..w).rev() {
                for &(dx, dy, dist) in &BACKWARD {
                    relax(input, output, &mut pos_buffer, w, h, x, y, dx, dy, dist);
                }
            }
        }

        for y in 0..height {
            for x in 0..width {
                let v = output.get_pixel_f32(x, y);
                let signed = if input.get_pixel_bit(x, y) { -v } else { v };
                output.set_pixel_f32(x, y, signed);
            }
        }
    }
}
