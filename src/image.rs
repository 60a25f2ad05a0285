//! A planar bitmap with sub-rectangle views that alias a shared buffer.
//!
//! A view never allocates: it carries its own `(min_x, min_y, max_x, max_y)`
//! window into a buffer shared (via reference counting) with every other
//! view of the same allocation. Writes through one view are visible through
//! every other view that overlaps it. This crate is single-threaded by
//! construction, so the shared buffer is an `Rc<RefCell<Vec<u8>>>` rather
//! than anything requiring a mutex.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use image::{DynamicImage, ImageBuffer, Luma};

use crate::error::{AtlasError, Result};
use crate::geometry::Vec2;

/// Bit depths an [`Image`] may hold a pixel at.
pub const VALID_BIT_DEPTHS: [u8; 6] = [1, 2, 4, 8, 16, 32];

fn stride_for(width: u32, bit_depth: u8) -> usize {
    ((width as usize * bit_depth as usize) + 7) / 8
}

/// A 2D raster, or an aliasing view into one.
#[derive(Clone)]
pub struct Image {
    stride: usize,
    bit_depth: u8,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    data: Rc<RefCell<Vec<u8>>>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bit_depth", &self.bit_depth)
            .finish()
    }
}

impl Image {
    /// Allocates a fresh, zeroed image of `width` x `height` pixels at the
    /// given bit depth.
    pub fn new(width: u32, height: u32, bit_depth: u8) -> Image {
        assert!(
            VALID_BIT_DEPTHS.contains(&bit_depth),
            "unsupported bit depth {bit_depth}"
        );
        let stride = stride_for(width, bit_depth);
        let data = vec![0u8; stride * height as usize];
        Image {
            stride,
            bit_depth,
            min_x: 0,
            min_y: 0,
            max_x: width,
            max_y: height,
            data: Rc::new(RefCell::new(data)),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn size(&self) -> Vec2<u32> {
        Vec2::new(self.width(), self.height())
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Returns an aliasing sub-window of `self`. `min`/`max` are given in
    /// `self`'s own coordinate frame (`0..width, 0..height`).
    pub fn view(&self, min: Vec2<u32>, max: Vec2<u32>) -> Image {
        self.view_padded(min, max, 0)
    }

    /// As [`Image::view`], but the returned view is contracted by
    /// `padding` pixels on every side, so glyph content lands inside a
    /// padded margin.
    pub fn view_padded(&self, min: Vec2<u32>, max: Vec2<u32>, padding: u32) -> Image {
        assert!(max.x >= min.x + 2 * padding && max.y >= min.y + 2 * padding);
        let min = Vec2::new(min.x + padding, min.y + padding);
        let max = Vec2::new(max.x - padding, max.y - padding);
        assert!(self.min_x + max.x <= self.max_x && self.min_y + max.y <= self.max_y);
        Image {
            stride: self.stride,
            bit_depth: self.bit_depth,
            min_x: self.min_x + min.x,
            min_y: self.min_y + min.y,
            max_x: self.min_x + max.x,
            max_y: self.min_y + max.y,
            data: Rc::clone(&self.data),
        }
    }

    /// Reads one pixel, narrowed/widened to fit `bit_depth`.
    pub fn get_pixel_u32(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width() && y < self.height());
        let ox = x + self.min_x;
        let oy = y + self.min_y;
        let buf = self.data.borrow();
        if self.bit_depth <= 8 {
            let per_byte = 8 / self.bit_depth as u32;
            let byte = buf[oy as usize * self.stride + (ox / per_byte) as usize];
            let bit_pos = ox % per_byte;
            let shift = 8 - (bit_pos + 1) * self.bit_depth as u32;
            ((byte as u32) >> shift) & ((1u32 << self.bit_depth) - 1)
        } else {
            let n_bytes = self.bit_depth as usize / 8;
            let base = oy as usize * self.stride + ox as usize * n_bytes;
            let mut v = 0u32;
            for i in 0..n_bytes {
                v = (v << 8) | buf[base + i] as u32;
            }
            v
        }
    }

    /// Writes one pixel, preserving neighbouring sub-byte pixels via a
    /// read-modify-write mask.
    pub fn set_pixel_u32(&self, x: u32, y: u32, value: u32) {
        assert!(x < self.width() && y < self.height());
        let ox = x + self.min_x;
        let oy = y + self.min_y;
        let mut buf = self.data.borrow_mut();
        if self.bit_depth <= 8 {
            let per_byte = 8 / self.bit_depth as u32;
            let idx = oy as usize * self.stride + (ox / per_byte) as usize;
            let bit_pos = ox % per_byte;
            let shift = 8 - (bit_pos + 1) * self.bit_depth as u32;
            let mask = ((1u32 << self.bit_depth) - 1) << shift;
            let v = (value << shift) & mask;
            buf[idx] = ((buf[idx] as u32 & !mask) | v) as u8;
        } else {
            let n_bytes = self.bit_depth as usize / 8;
            let base = oy as usize * self.stride + ox as usize * n_bytes;
            let mut v = value;
            for i in (0..n_bytes).rev() {
                buf[base + i] = (v & 0xFF) as u8;
                v >>= 8;
            }
        }
    }

    pub fn get_pixel_u8(&self, x: u32, y: u32) -> u8 {
        debug_assert_eq!(self.bit_depth, 8);
        self.get_pixel_u32(x, y) as u8
    }

    pub fn set_pixel_u8(&self, x: u32, y: u32, value: u8) {
        debug_assert_eq!(self.bit_depth, 8);
        self.set_pixel_u32(x, y, value as u32);
    }

    pub fn get_pixel_u16(&self, x: u32, y: u32) -> u16 {
        debug_assert_eq!(self.bit_depth, 16);
        self.get_pixel_u32(x, y) as u16
    }

    pub fn set_pixel_u16(&self, x: u32, y: u32, value: u16) {
        debug_assert_eq!(self.bit_depth, 16);
        self.set_pixel_u32(x, y, value as u32);
    }

    pub fn get_pixel_f32(&self, x: u32, y: u32) -> f32 {
        debug_assert_eq!(self.bit_depth, 32);
        f32::from_bits(self.get_pixel_u32(x, y))
    }

    pub fn set_pixel_f32(&self, x: u32, y: u32, value: f32) {
        debug_assert_eq!(self.bit_depth, 32);
        self.set_pixel_u32(x, y, value.to_bits());
    }

    pub fn get_pixel_bit(&self, x: u32, y: u32) -> bool {
        debug_assert_eq!(self.bit_depth, 1);
        self.get_pixel_u32(x, y) != 0
    }

    pub fn set_pixel_bit(&self, x: u32, y: u32, value: bool) {
        debug_assert_eq!(self.bit_depth, 1);
        self.set_pixel_u32(x, y, value as u32);
    }

    /// Zeroes every byte belonging to the view's rows.
    pub fn clear(&self) {
        let mut buf = self.data.borrow_mut();
        for y in self.min_y..self.max_y {
            let row_start = y as usize * self.stride;
            for byte in &mut buf[row_start..row_start + self.stride] {
                *byte = 0;
            }
        }
    }

    /// Fills every pixel in the window-relative rectangle `[origin,
    /// origin+size)` with `value`.
    pub fn fill_rect(&self, origin: Vec2<u32>, size: Vec2<u32>, value: u32) {
        for y in origin.y..origin.y + size.y {
            for x in origin.x..origin.x + size.x {
                self.set_pixel_u32(x, y, value);
            }
        }
    }

    /// Copies `other` into `self`, pixel by pixel, rescaling values if the
    /// bit depths differ. Both images must have equal dimensions.
    pub fn load(&self, other: &Image) -> Result<()> {
        if self.width() != other.width() || self.height() != other.height() {
            return Err(AtlasError::Argument(format!(
                "load: size mismatch ({}x{} into {}x{})",
                other.width(),
                other.height(),
                self.width(),
                self.height()
            )));
        }
        let src_max = (1u64 << other.bit_depth) - 1;
        let dst_max = (1u64 << self.bit_depth) - 1;
        for y in 0..self.height() {
            for x in 0..self.width() {
                let raw = other.get_pixel_u32(x, y) as u64;
                let scaled = if src_max == dst_max {
                    raw
                } else {
                    (raw * dst_max) / src_max.max(1)
                };
                self.set_pixel_u32(x, y, scaled as u32);
            }
        }
        Ok(())
    }

    /// Builds a 1-bit mask `Image` from a packed external bitmap (e.g. a
    /// FreeType-like mono bitmap). `pitch` is the byte stride of `buffer`;
    /// `invert` normalises the source's polarity so that set bits become
    /// foreground (`1`) in the returned image, per the convention this
    /// crate uses at the `Image` boundary.
    pub fn from_packed_bitmap(
        width: u32,
        height: u32,
        pitch: usize,
        buffer: &[u8],
        invert: bool,
    ) -> Image {
        let img = Image::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                let byte = buffer[y as usize * pitch + (x / 8) as usize];
                let bit = (byte >> (7 - x % 8)) & 1;
                let bit = if invert { 1 - bit } else { bit };
                img.set_pixel_bit(x, y, bit != 0);
            }
        }
        img
    }

    /// Builds a 1-bit mask `Image` by thresholding an 8-bit coverage
    /// bitmap (such as the `A8` canvas a glyph rasteriser produces) at the
    /// midpoint. Values at or above half range become foreground.
    pub fn mask_from_coverage(width: u32, height: u32, stride: usize, coverage: &[u8]) -> Image {
        let img = Image::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                let v = coverage[y as usize * stride + x as usize];
                img.set_pixel_bit(x, y, v >= 128);
            }
        }
        img
    }

    /// Encodes `self` (bit depth 1, 2, 4 or 8) as an 8-bit grayscale PNG,
    /// widening sub-byte samples to fill the 0..=255 range.
    pub fn export_u8(&self, path: impl AsRef<Path>) -> Result<()> {
        let max_val = (1u32 << self.bit_depth.min(8)) - 1;
        let buf: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
                let raw = self.get_pixel_u32(x, y);
                Luma([((raw * 255) / max_val.max(1)) as u8])
            });
        buf.save(path.as_ref()).map_err(|e| AtlasError::Decode {
            path: path.as_ref().to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Encodes `self` (bit depth 16) as a 16-bit grayscale PNG.
    pub fn export_u16(&self, path: impl AsRef<Path>) -> Result<()> {
        debug_assert_eq!(self.bit_depth, 16);
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
                Luma([self.get_pixel_u16(x, y)])
            });
        DynamicImage::ImageLuma16(buf)
            .save(path.as_ref())
            .map_err(|e| AtlasError::Decode {
                path: path.as_ref().to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn normalized_f32(&self, x: u32, y: u32, black: f32, white: f32) -> f32 {
        let v = self.get_pixel_f32(x, y);
        ((v - black) / (white - black)).clamp(0.0, 1.0)
    }

    /// Encodes a 32-bit float distance field as an 8-bit grayscale PNG,
    /// mapping `[black, white]` onto `0..=255`.
    pub fn export_distance_field_u8(
        &self,
        path: impl AsRef<Path>,
        black: f32,
        white: f32,
    ) -> Result<()> {
        debug_assert_eq!(self.bit_depth, 32);
        let buf: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
                Luma([(self.normalized_f32(x, y, black, white) * 255.0).round() as u8])
            });
        buf.save(path.as_ref()).map_err(|e| AtlasError::Decode {
            path: path.as_ref().to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Encodes a 32-bit float distance field as a 16-bit grayscale PNG,
    /// mapping `[black, white]` onto `0..=65535`.
    pub fn export_distance_field_u16(
        &self,
        path: impl AsRef<Path>,
        black: f32,
        white: f32,
    ) -> Result<()> {
        debug_assert_eq!(self.bit_depth, 32);
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
                Luma([(self.normalized_f32(x, y, black, white) * 65535.0).round() as u16])
            });
        DynamicImage::ImageLuma16(buf)
            .save(path.as_ref())
            .map_err(|e| AtlasError::Decode {
                path: path.as_ref().to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Decodes a grayscale PNG. If `forced_bit_depth` is lower than the
    /// file's native depth, samples are linearly rescaled down (not just
    /// truncated) to the requested depth.
    pub fn decode_png(path: impl AsRef<Path>, forced_bit_depth: Option<u8>) -> Result<Image> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(AtlasError::InputNotFound(path_ref.to_path_buf()));
        }
        let dynamic = image::open(path_ref).map_err(|e| AtlasError::Decode {
            path: path_ref.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (native_depth, width, height, img) = match &dynamic {
            DynamicImage::ImageLuma16(buf) => (16u8, buf.width(), buf.height(), dynamic.clone()),
            _ => {
                let buf = dynamic.to_luma8();
                let (w, h) = (buf.width(), buf.height());
                (8u8, w, h, DynamicImage::ImageLuma8(buf))
            }
        };

        let decoded = Image::new(width, height, native_depth);
        match &img {
            DynamicImage::ImageLuma8(buf) => {
                for y in 0..height {
                    for x in 0..width {
                        decoded.set_pixel_u8(x, y, buf.get_pixel(x, y).0[0]);
                    }
                }
            }
            DynamicImage::ImageLuma16(buf) => {
                for y in 0..height {
                    for x in 0..width {
                        decoded.set_pixel_u16(x, y, buf.get_pixel(x, y).0[0]);
                    }
                }
            }
            _ => {
                return Err(AtlasError::UnsupportedFormat(
                    "expected a grayscale PNG".to_string(),
                ))
            }
        }

        match forced_bit_depth {
            None | Some(d) if forced_bit_depth == Some(native_depth) || forced_bit_depth.is_none() => {
                Ok(decoded)
            }
            Some(1) => {
                // A linear rescale degenerates to "only the brightest
                // sample survives" at this target depth; threshold at
                // half range instead, matching `mask_from_coverage`'s
                // foreground convention.
                let src_max = (1u64 << native_depth) - 1;
                let half = src_max / 2;
                let reduced = Image::new(width, height, 1);
                for y in 0..height {
                    for x in 0..width {
                        let raw = decoded.get_pixel_u32(x, y) as u64;
                        reduced.set_pixel_bit(x, y, raw > half);
                    }
                }
                Ok(reduced)
            }
            Some(target) if target < native_depth => {
                let reduced = Image::new(width, height, target);
                let src_max = (1u64 << native_depth) - 1;
                let dst_max = (1u64 << target) - 1;
                for y in 0..height {
                    for x in 0..width {
                        let raw = decoded.get_pixel_u32(x, y) as u64;
                        let scaled = (raw * dst_max) / src_max;
                        reduced.set_pixel_u32(x, y, scaled as u32);
                    }
                }
                Ok(reduced)
            }
            Some(target) => Err(AtlasError::UnsupportedFormat(format!(
                "cannot widen a decoded PNG from {native_depth}-bit to {target}-bit"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_bit_depth() {
        for &depth in &[1u8, 2, 4, 8, 16] {
            let img = Image::new(4, 4, depth);
            let max_val = (1u32 << depth) - 1;
            img.set_pixel_u32(1, 2, max_val);
            for y in 0..4 {
                for x in 0..4 {
                    let expected = if (x, y) == (1, 2) { max_val } else { 0 };
                    assert_eq!(
                        img.get_pixel_u32(x, y),
                        expected,
                        "bit depth {depth} pixel ({x},{y})"
                    );
                }
            }
        }
    }

    #[test]
    fn from_packed_bitmap_reads_msb_first_and_ignores_tail_bits() {
        // width=10 needs 2 bytes/row (pitch=2); bits beyond the 10th pixel
        // are garbage in the source buffer and must never surface in the
        // decoded image.
        let width = 10;
        let height = 2;
        let pitch = 2;
        let buffer = [
            0b1000_0000, 0b0100_0011, // row 0: x=0 and x=9 set, trailing garbage in byte 1
            0b0000_0001, 0b0000_0000, // row 1: x=7 set
        ];
        let img = Image::from_packed_bitmap(width, height, pitch, &buffer, false);
        assert!(img.get_pixel_bit(0, 0));
        assert!(img.get_pixel_bit(9, 0));
        for x in 1..9 {
            assert!(!img.get_pixel_bit(x, 0), "pixel ({x},0) should be background");
        }
        assert!(img.get_pixel_bit(7, 1));
        for x in (0..width).filter(|&x| x != 7) {
            assert!(!img.get_pixel_bit(x, 1), "pixel ({x},1) should be background");
        }

        let inverted = Image::from_packed_bitmap(width, height, pitch, &buffer, true);
        assert!(!inverted.get_pixel_bit(0, 0));
        assert!(!inverted.get_pixel_bit(9, 0));
        assert!(inverted.get_pixel_bit(1, 0));
        assert!(!inverted.get_pixel_bit(7, 1));
        assert!(inverted.get_pixel_bit(0, 1));
    }

    #[test]
    fn view_aliases_parent() {
        let parent = Image::new(10, 10, 8);
        let sub = parent.view(Vec2::new(2, 2), Vec2::new(8, 8));
        assert_eq!(sub.width(), 6);
        assert_eq!(sub.height(), 6);
        sub.set_pixel_u8(0, 0, 42);
        assert_eq!(parent.get_pixel_u8(2, 2), 42);

        // Writing the complement of a 10x10 sub-view twice restores the
        // original.
        let whole = Image::new(10, 10, 8);
        for y in 0..10 {
            for x in 0..10 {
                whole.set_pixel_u8(x, y, ((x + y) % 251) as u8);
            }
        }
        let mut before = vec![0u8; 100];
        for y in 0..10 {
            for x in 0..10 {
                before[(y * 10 + x) as usize] = whole.get_pixel_u8(x, y);
            }
        }
        let window = whole.view(Vec2::new(0, 0), Vec2::new(10, 10));
        for y in 0..10 {
            for x in 0..10 {
                let v = window.get_pixel_u8(x, y);
                window.set_pixel_u8(x, y, 255 - v);
            }
        }
        for y in 0..10 {
            for x in 0..10 {
                let v = window.get_pixel_u8(x, y);
                window.set_pixel_u8(x, y, 255 - v);
            }
        }
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(whole.get_pixel_u8(x, y), before[(y * 10 + x) as usize]);
            }
        }
    }

    #[test]
    fn clear_zeroes_view_rows() {
        let img = Image::new(4, 4, 8);
        for y in 0..4 {
            for x in 0..4 {
                img.set_pixel_u8(x, y, 7);
            }
        }
        img.clear();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(img.get_pixel_u8(x, y), 0);
            }
        }
    }

    #[test]
    fn fill_rect_only_touches_window() {
        let img = Image::new(4, 4, 8);
        img.fill_rect(Vec2::new(1, 1), Vec2::new(2, 2), 9);
        for y in 0..4 {
            for x in 0..4 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                assert_eq!(img.get_pixel_u8(x, y), if inside { 9 } else { 0 });
            }
        }
    }

    #[test]
    fn png_round_trip_16bit_two_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let img = Image::new(8, 8, 16);
        img.set_pixel_u16(3, 4, 26781);
        img.set_pixel_u16(4, 5, 42949);
        img.export_u16(&path).unwrap();
        let decoded = Image::decode_png(&path, None).unwrap();
        assert_eq!(decoded.bit_depth(), 16);
        for y in 0..8 {
            for x in 0..8 {
                let expected = match (x, y) {
                    (3, 4) => 26781,
                    (4, 5) => 42949,
                    _ => 0,
                };
                assert_eq!(decoded.get_pixel_u16(x, y), expected);
            }
        }
    }
}
