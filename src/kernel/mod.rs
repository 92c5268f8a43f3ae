//! Block scoring kernels.
//!
//! A kernel scores one placement of the target block against a source block
//! plan. Correlation kernels implement [`Kernel`] so the scalar and SIMD
//! variants are interchangeable; the square-difference kernel takes an extra
//! validity mask and is used directly.

use crate::ImageView;

/// Correlation kernel scoring a source plan at one target placement.
pub trait Kernel {
    type Plan;

    /// Computes the score with the target block anchored (top-left) at `(x, y)`.
    ///
    /// Returns `f32::NEG_INFINITY` when the score is undefined: the block
    /// leaves the target or its variance is not above `min_var`.
    fn score_at(target: ImageView<'_, f32>, plan: &Self::Plan, x: usize, y: usize, min_var: f32)
        -> f32;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;
