//! Intensity normalization and scale-space filtering for `f32` images.
//!
//! Gaussian smoothing is separable with replicate-border handling. Kernels
//! have `max(3, 2 * round(3σ) + 1)` taps and sum to one.
//!
//! Downsampling by a factor `scale` keeps the pixel-grid convention used by
//! the matchers: destination pixel `i` samples the smoothed source at `i / scale`,
//! so a point at `p` in the source lands at `p * scale` in the result.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::sigma_for_scale;
use crate::util::{BlockMatchError, BlockMatchResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Linearly maps finite samples to `[0, 1]` using the image min and max.
///
/// Non-finite samples are left untouched. A constant image maps to all zeros.
pub fn normalize_contrast(img: &mut OwnedImage) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in img.data().iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        return;
    }

    let range = max - min;
    for v in img.data_mut().iter_mut().filter(|v| v.is_finite()) {
        *v = if range > 0.0 { (*v - min) / range } else { 0.0 };
    }
}

/// Builds a normalized 1D Gaussian kernel.
///
/// A non-positive σ yields the identity kernel `[1.0]`.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = ((3.0 * sigma + 0.5) as usize).max(1);
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Convolves the image with `kernel_x` along rows, then `kernel_y` along columns.
///
/// Both kernels must have odd length. Border samples are replicated.
pub fn convolve_separable(img: &mut OwnedImage, kernel_x: &[f32], kernel_y: &[f32]) {
    let width = img.width();
    let height = img.height();
    let mut tmp = vec![0.0f32; width * height];

    if kernel_x.len() > 1 {
        let r = (kernel_x.len() / 2) as isize;
        let src = img.data();
        for y in 0..height {
            let row = &src[y * width..(y + 1) * width];
            for x in 0..width {
                let mut acc = 0.0f32;
                for (k, &w) in kernel_x.iter().enumerate() {
                    let sx = (x as isize + k as isize - r).clamp(0, width as isize - 1);
                    acc += w * row[sx as usize];
                }
                tmp[y * width + x] = acc;
            }
        }
        img.data_mut().copy_from_slice(&tmp);
    }

    if kernel_y.len() > 1 {
        let r = (kernel_y.len() / 2) as isize;
        let src = img.data();
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0.0f32;
                for (k, &w) in kernel_y.iter().enumerate() {
                    let sy = (y as isize + k as isize - r).clamp(0, height as isize - 1);
                    acc += w * src[sy as usize * width + x];
                }
                tmp[y * width + x] = acc;
            }
        }
        img.data_mut().copy_from_slice(&tmp);
    }
}

/// Smooths the image with an isotropic Gaussian of standard deviation `sigma`.
pub fn gaussian_blur(img: &mut OwnedImage, sigma: f32) {
    let kernel = gaussian_kernel(sigma);
    convolve_separable(img, &kernel, &kernel);
}

/// Smooths a full-resolution image so its frequency content matches a copy
/// reduced by `scale`, without resampling it.
pub fn smooth_for_scale(img: &mut OwnedImage, scale: f32, source_sigma: f32, target_sigma: f32) {
    if scale >= 1.0 {
        return;
    }
    gaussian_blur(img, sigma_for_scale(scale, source_sigma, target_sigma));
}

/// Anti-aliased downsampling by `scale` in `(0, 1]`.
///
/// The result has `floor((n - 1) * scale) + 1` samples along each axis.
pub fn downsample(
    src: ImageView<'_, f32>,
    scale: f32,
    source_sigma: f32,
    target_sigma: f32,
) -> BlockMatchResult<OwnedImage> {
    if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
        return Err(BlockMatchError::InvalidConfig {
            reason: "scale must be in (0, 1]",
        });
    }

    let mut smoothed = OwnedImage::from_view(src)?;
    smooth_for_scale(&mut smoothed, scale, source_sigma, target_sigma);
    if scale == 1.0 {
        return Ok(smoothed);
    }

    let width = ((src.width() - 1) as f32 * scale).floor() as usize + 1;
    let height = ((src.height() - 1) as f32 * scale).floor() as usize + 1;
    let view = smoothed.view();
    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;
    OwnedImage::from_fn(width, height, |x, y| {
        let sx = (x as f32 / scale).min(max_x);
        let sy = (y as f32 / scale).min(max_y);
        view.sample_bilinear(sx, sy).unwrap_or(f32::NAN)
    })
}

/// Overwrites every sample with uniform noise in `[0, 1)` drawn from a
/// generator seeded with `seed`.
pub fn fill_with_noise(img: &mut OwnedImage, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for v in img.data_mut().iter_mut() {
        *v = rng.random::<f32>();
    }
}
