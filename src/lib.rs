//! Rasterises font glyphs, computes signed distance fields for them, and
//! packs the results into texture atlases.
//!
//! Given a font and a set of glyphs, this crate rasterises each glyph to a
//! bilevel mask, optionally runs a distance transform over it, packs the
//! results into a single atlas image, and can emit a BMFont-style `.fnt`
//! descriptor alongside it. Atlases are built once, offline, as a batch:
//! every glyph you ask for is rasterised and packed up front, trading the
//! flexibility of on-demand population for simplicity and better packing
//! density.
//!
//! Signed distance fields are a clever way to get decent-quality realtime
//! text rendering with low runtime cost: storing the distance to the nearest
//! edge, rather than raw coverage, lets a renderer reconstruct crisp edges at
//! any scale from a single low-resolution texture lookup.

pub mod atlas;
pub mod cli;
pub mod descriptor;
pub mod distance_transform;
pub mod downsample;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod image;
pub mod packing;
pub mod presets;
pub mod raster;

pub use error::{AtlasError, Result};
pub use image::Image;
