//! Mean and sample variance of rectangular blocks.
//!
//! Both functions expect the block to lie fully inside the image. This is
//! only checked in debug builds; an out-of-range block panics on indexing.

use crate::image::ImageView;

/// Arithmetic mean of the `width x height` block anchored at `(x0, y0)`.
pub fn block_mean(image: ImageView<'_, f32>, x0: usize, y0: usize, width: usize, height: usize) -> f32 {
    debug_assert!(image.contains_block(x0 as i64, y0 as i64, width, height));
    let data = image.as_slice();
    let stride = image.stride();

    let mut sum = 0.0f64;
    for y in y0..y0 + height {
        let row = &data[y * stride + x0..y * stride + x0 + width];
        for &v in row {
            sum += f64::from(v);
        }
    }
    (sum / (width * height) as f64) as f32
}

/// Sample variance (divisor `width·height − 1`) of the block anchored at
/// `(x0, y0)`, given its mean.
pub fn block_variance(
    image: ImageView<'_, f32>,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
    mean: f32,
) -> f32 {
    debug_assert!(image.contains_block(x0 as i64, y0 as i64, width, height));
    let data = image.as_slice();
    let stride = image.stride();

    let mut sum = 0.0f64;
    for y in y0..y0 + height {
        let row = &data[y * stride + x0..y * stride + x0 + width];
        for &v in row {
            let a = f64::from(v - mean);
            sum += a * a;
        }
    }
    (sum / (width * height - 1) as f64) as f32
}
