//! SIMD-accelerated correlation kernel using the `wide` crate.
//!
//! The inner block loop is vectorized to process 8 samples at a time using
//! `f32x8`. Target statistics and the cross term are gathered in one pass
//! over samples shifted by the block's first sample `t₀`; since the source
//! plan is zero-mean, `Σ s'·(t − t̄) = Σ s'·(t − t₀)`. The shift keeps the
//! one-pass variance stable on bright, low-contrast blocks.

use crate::block::PmccBlockPlan;
use crate::kernel::Kernel;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

/// SIMD Pearson correlation kernel.
pub struct PmccSimd;

impl Kernel for PmccSimd {
    type Plan = PmccBlockPlan;

    fn score_at(
        target: ImageView<'_, f32>,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        min_var: f32,
    ) -> f32 {
        let width = plan.width();
        let height = plan.height();
        if !target.contains_block(x as i64, y as i64, width, height) {
            return f32::NEG_INFINITY;
        }

        let pivot = match target.row(y) {
            Some(row) => row[x],
            None => return f32::NEG_INFINITY,
        };
        let pivot_vec = f32x8::splat(pivot);
        let zero_mean = plan.zero_mean();
        let simd_end = width / LANES * LANES;

        let mut dot_vec = f32x8::ZERO;
        let mut sum_vec = f32x8::ZERO;
        let mut sum2_vec = f32x8::ZERO;
        let mut dot_s = 0.0f32;
        let mut sum_s = 0.0f32;
        let mut sum2_s = 0.0f32;

        for ty in 0..height {
            let row = match target.row(y + ty) {
                Some(row) => &row[x..x + width],
                None => return f32::NEG_INFINITY,
            };
            let base = ty * width;

            let mut tx = 0;
            while tx < simd_end {
                let t = load_f32x8(&row[tx..]) - pivot_vec;
                let s = load_f32x8(&zero_mean[base + tx..]);
                dot_vec += s * t;
                sum_vec += t;
                sum2_vec += t * t;
                tx += LANES;
            }

            while tx < width {
                let t = row[tx] - pivot;
                dot_s += zero_mean[base + tx] * t;
                sum_s += t;
                sum2_s += t * t;
                tx += 1;
            }
        }

        let n = (width * height) as f32;
        let dot = hsum(dot_vec) + dot_s;
        let sum = hsum(sum_vec) + sum_s;
        let sum2 = hsum(sum2_vec) + sum2_s;

        let var_t = (sum2 - sum * sum / n) / (n - 1.0);
        if !var_t.is_finite() || var_t <= min_var {
            return f32::NEG_INFINITY;
        }

        let r = dot / (plan.std() * var_t.sqrt() * (n - 1.0));
        if r.is_finite() {
            r.clamp(-1.0, 1.0)
        } else {
            f32::NEG_INFINITY
        }
    }
}
