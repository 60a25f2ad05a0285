//! Parabola Envelope: the Felzenszwalb-Huttenlocher exact squared
//! Euclidean distance transform, applied as two separable 1-D passes
//! (rows, then columns) over the lower envelope of unit parabolas rooted
//! at each sample.

use crate::image::Image;

use super::DistanceTransform;

pub struct ParabolaEnvelope;

const LARGE_DISTANCE: f64 = 1e20;

/// Computes the lower envelope of parabolas rooted at `src[q] + q^2` for
/// every `q`, writing the envelope's value at each `q` into `dst`. Runs
/// entirely in `f64`; callers narrow to `f32` only once the whole
/// separable transform has finished.
fn transform_line(src: &[f64], dst: &mut [f64]) {
    let length = src.len();
    if length == 0 {
        return;
    }
    let mut apex = vec![0usize; length];
    let mut range = vec![0f64; length + 1];
    range[0] = f64::NEG_INFINITY;
    range[1] = f64::INFINITY;

    let mut parabola: isize = 0;
    for q in 1..length {
        let mut s;
        loop {
            let a = apex[parabola as usize];
            s = ((src[q] + (q * q) as f64) - (src[a] + (a * a) as f64))
                / (2.0 * (q as f64 - a as f64));
            let keep_popping = s <= range[parabola as usize];
            parabola -= 1;
            if !keep_popping {
                break;
            }
        }
        parabola += 2;
        apex[parabola as usize] = q;
        range[parabola as usize] = s;
        range[(parabola + 1) as usize] = f64::INFINITY;
    }

    let mut parabola = 0usize;
    for (q, slot) in dst.iter_mut().enumerate() {
        while range[parabola + 1] < q as f64 {
            parabola += 1;
        }
        let a = apex[parabola];
        let d = q as f64 - a as f64;
        *slot = src[a] + d * d;
    }
}

/// Runs the separable two-pass envelope over a full 2D grid seeded at
/// every pixel for which `is_seed` holds (those pixels start at squared
/// distance 0, everything else at `LARGE_DISTANCE`). Returns squared
/// distance to the nearest seed pixel, not yet square-rooted.
fn squared_distance_to_seeds(width: u32, height: u32, is_seed: impl Fn(u32, u32) -> bool) -> Vec<f64> {
    let (w, h) = (width as usize, height as usize);
    let mut grid = vec![0f64; w * h];
    for y in 0..height {
        for x in 0..width {
            grid[y as usize * w + x as usize] = if is_seed(x, y) { 0.0 } else { LARGE_DISTANCE };
        }
    }

    let length = width.max(height) as usize;
    let mut src = vec![0f64; length];
    let mut dst = vec![0f64; length];

    for y in 0..h {
        src[..w].copy_from_slice(&grid[y * w..y * w + w]);
        transform_line(&src[..w], &mut dst[..w]);
        grid[y * w..y * w + w].copy_from_slice(&dst[..w]);
    }
    for x in 0..w {
        for y in 0..h {
            src[y] = grid[y * w + x];
        }
        transform_line(&src[..h], &mut dst[..h]);
        for y in 0..h {
            grid[y * w + x] = dst[y];
        }
    }
    grid
}

impl DistanceTransform for ParabolaEnvelope {
    fn transform(&self, input: &Image, output: &Image) {
        let width = input.width();
        let height = input.height();
        assert_eq!(input.bit_depth(), 1, "parabola envelope input must be a 1-bit mask");
        assert_eq!(output.bit_depth(), 32, "parabola envelope output must be 32-bit float");
        assert_eq!((output.width(), output.height()), (width, height));

        // Distance from every pixel to the nearest *background* pixel
        // (used for the foreground interior) and to the nearest
        // *foreground* pixel (used outside), each via its own EDT pass:
        // a pixel seeded at distance 0 in one grid is never the nearest
        // seed of itself in the other.
        let dist_to_background =
            squared_distance_to_seeds(width, height, |x, y| !input.get_pixel_bit(x, y));
        let dist_to_foreground =
            squared_distance_to_seeds(width, height, |x, y| input.get_pixel_bit(x, y));

        let w = width as usize;
        for y in 0..height {
            for x in 0..width {
                let idx = y as usize * w + x as usize;
                let signed = if input.get_pixel_bit(x, y) {
                    -dist_to_background[idx].sqrt()
                } else {
                    dist_to_foreground[idx].sqrt()
                };
                output.set_pixel_f32(x, y, signed as f32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    #[test]
    fn single_row_envelope_matches_brute_force_squared_distance() {
        let src = vec![LARGE_DISTANCE, LARGE_DISTANCE, 0.0, LARGE_DISTANCE, LARGE_DISTANCE];
        let mut dst = vec![0.0; 5];
        transform_line(&src, &mut dst);
        let expected: Vec<f64> = (0..5i32).map(|q| ((q - 2) * (q - 2)) as f64).collect();
        for (got, want) in dst.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-3, "{got} != {want}");
        }
    }

    #[test]
    fn interior_of_a_solid_block_grows_negative_away_from_its_edge() {
        // A 9x9 all-foreground block: the center pixel sits 4 pixels from
        // every edge, so its signed distance should be strongly negative,
        // not 0 (seeding every foreground pixel, rather than just the
        // boundary, used to collapse the whole interior to 0).
        let mask = Image::new(9, 9, 1);
        for y in 0..9 {
            for x in 0..9 {
                mask.set_pixel_bit(x, y, true);
            }
        }
        let output = Image::new(9, 9, 32);
        ParabolaEnvelope.transform(&mask, &output);
        assert_eq!(output.get_pixel_f32(4, 4), -4.0);
        assert_eq!(output.get_pixel_f32(0, 4), 0.0);
    }
}
