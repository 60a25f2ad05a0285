//! Crate-wide error type. One variant per error kind named in the error
//! handling design: missing input, decode failure, atlas capacity,
//! unsupported pixel format, a missing glyph, or a bad CLI combination.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("rectangles do not fit in a {width}x{height} atlas")]
    Capacity { width: u32, height: u32 },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("font has no glyph for code point U+{0:04X}")]
    GlyphMissing(u32),

    #[error("invalid arguments: {0}")]
    Argument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
