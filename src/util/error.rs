//! Error types for blockmatch.

use thiserror::Error;

/// Result alias for blockmatch operations.
pub type BlockMatchResult<T> = std::result::Result<T, BlockMatchError>;

/// Errors that can occur when setting up a block-matching run.
///
/// Per-point outcomes (a block leaving the image, an ambiguous response) are
/// not errors; they only remove the point from the output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BlockMatchError {
    /// Width or height is zero, or the element count overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside its image.
    #[error("roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Matcher parameters are unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image decoding or file access failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
