//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Intensities are
//! converted to `f32` in `[0, 1]`.

use crate::image::OwnedImage;
use crate::util::{BlockMatchError, BlockMatchResult};
use std::path::Path;

/// Creates an owned float image from an 8-bit grayscale buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> BlockMatchResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
    OwnedImage::new(data, width, height)
}

/// Creates an owned float image from any decoded image, converting to luma.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> BlockMatchResult<OwnedImage> {
    match img {
        image::DynamicImage::ImageLuma8(gray) => owned_from_gray_image(gray),
        other => owned_from_gray_image(&other.to_luma8()),
    }
}

/// Loads an image from disk and converts it to a grayscale float image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> BlockMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| BlockMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
