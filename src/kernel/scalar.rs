//! Scalar reference kernels for block scoring.

use crate::block::stats::{block_mean, block_variance};
use crate::block::{PmccBlockPlan, SsdBlockPlan};
use crate::kernel::Kernel;
use crate::ImageView;

/// Scalar Pearson correlation kernel.
pub struct PmccScalar;

/// Scalar square-difference kernel that skips invalid samples on either side.
pub struct SsdMaskedScalar;

impl Kernel for PmccScalar {
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

        let mean_t = block_mean(target, x, y, width, height);
        let var_t = block_variance(target, x, y, width, height, mean_t);
        if !var_t.is_finite() || var_t <= min_var {
            return f32::NEG_INFINITY;
        }

        let zero_mean = plan.zero_mean();
        let mut dot = 0.0f64;
        for ty in 0..height {
            let row = match target.row(y + ty) {
                Some(row) => &row[x..x + width],
                None => return f32::NEG_INFINITY,
            };
            let base = ty * width;
            for (tx, &t) in row.iter().enumerate() {
                dot += f64::from(zero_mean[base + tx]) * f64::from(t - mean_t);
            }
        }

        let n = (width * height) as f64;
        let denom = f64::from(plan.std()) * f64::from(var_t).sqrt() * (n - 1.0);
        let r = dot / denom;
        if r.is_finite() {
            // Rounding can push a perfect match a hair past 1.
            r.clamp(-1.0, 1.0) as f32
        } else {
            f32::NEG_INFINITY
        }
    }
}

impl SsdMaskedScalar {
    /// Mean squared difference between the plan and the target block anchored
    /// at `(x, y)`, over sample pairs valid on both sides.
    ///
    /// `target_mask` has the target's layout with `1` for valid samples.
    /// Returns `None` if no sample pair is valid or the block leaves the target.
    pub fn score_at(
        target: ImageView<'_, f32>,
        target_mask: ImageView<'_, u8>,
        plan: &SsdBlockPlan,
        x: usize,
        y: usize,
    ) -> Option<f32> {
        let width = plan.width();
        let height = plan.height();
        if !target.contains_block(x as i64, y as i64, width, height)
            || !target_mask.contains_block(x as i64, y as i64, width, height)
        {
            return None;
        }

        let values = plan.values();
        let valid = plan.valid();
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for ty in 0..height {
            let row = &target.row(y + ty)?[x..x + width];
            let mask_row = &target_mask.row(y + ty)?[x..x + width];
            let base = ty * width;
            for tx in 0..width {
                if valid[base + tx] == 0 || mask_row[tx] == 0 {
                    continue;
                }
                let a = values[base + tx] - row[tx];
                sum += a * a;
                count += 1;
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Kernel, PmccScalar, SsdMaskedScalar};
    use crate::block::{BlockGeometry, PmccBlockPlan, SsdBlockPlan};
    use crate::image::OwnedImage;
    use crate::ImageView;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_image(width: usize, height: usize, seed: u64) -> OwnedImage {
        let mut rng = StdRng::seed_from_u64(seed);
        OwnedImage::from_fn(width, height, |_, _| rng.random::<f32>()).unwrap()
    }

    #[test]
    fn pmcc_of_identical_blocks_is_one() {
        let img = random_image(12, 10, 3);
        let geom = BlockGeometry::new(2, 2);
        let plan = PmccBlockPlan::from_block(img.view(), 4, 3, geom, 1e-12).unwrap();
        let r = PmccScalar::score_at(img.view(), &plan, 4, 3, 1e-12);
        assert!((r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pmcc_is_invariant_to_gain_and_offset_and_bounded() {
        let img = random_image(16, 16, 11);
        let scaled = OwnedImage::new(
            img.data().iter().map(|&v| 3.0 * v - 0.25).collect(),
            16,
            16,
        )
        .unwrap();
        let geom = BlockGeometry::new(3, 2);
        let plan = PmccBlockPlan::from_block(img.view(), 5, 5, geom, 1e-12).unwrap();
        assert!((PmccScalar::score_at(scaled.view(), &plan, 5, 5, 1e-12) - 1.0).abs() < 1e-5);

        for y in 0..=(16 - geom.height()) {
            for x in 0..=(16 - geom.width()) {
                let r = PmccScalar::score_at(img.view(), &plan, x, y, 1e-12);
                assert!((-1.0..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn pmcc_matches_bruteforce_formula() {
        let src = random_image(9, 9, 5);
        let tgt = random_image(9, 9, 6);
        let geom = BlockGeometry::new(2, 1);
        let plan = PmccBlockPlan::from_block(src.view(), 2, 3, geom, 1e-12).unwrap();
        let r = PmccScalar::score_at(tgt.view(), &plan, 1, 4, 1e-12);

        let (w, h) = (geom.width(), geom.height());
        let n = (w * h) as f64;
        let s: Vec<f64> = (0..h)
            .flat_map(|j| (0..w).map(move |i| (i, j)))
            .map(|(i, j)| src.get(2 + i, 3 + j).unwrap() as f64)
            .collect();
        let t: Vec<f64> = (0..h)
            .flat_map(|j| (0..w).map(move |i| (i, j)))
            .map(|(i, j)| tgt.get(1 + i, 4 + j).unwrap() as f64)
            .collect();
        let ms = s.iter().sum::<f64>() / n;
        let mt = t.iter().sum::<f64>() / n;
        let cov: f64 = s.iter().zip(&t).map(|(a, b)| (a - ms) * (b - mt)).sum();
        let vs: f64 = s.iter().map(|a| (a - ms) * (a - ms)).sum();
        let vt: f64 = t.iter().map(|b| (b - mt) * (b - mt)).sum();
        let expected = cov / (vs * vt).sqrt();
        assert!((r as f64 - expected).abs() < 1e-4);
    }

    #[test]
    fn pmcc_flat_target_is_undefined() {
        let src = random_image(8, 8, 1);
        let flat = OwnedImage::filled(8, 8, 0.3).unwrap();
        let plan =
            PmccBlockPlan::from_block(src.view(), 1, 1, BlockGeometry::new(1, 1), 1e-12).unwrap();
        assert_eq!(
            PmccScalar::score_at(flat.view(), &plan, 1, 1, 1e-12),
            f32::NEG_INFINITY
        );
        assert_eq!(
            PmccScalar::score_at(src.view(), &plan, 6, 6, 1e-12),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn ssd_skips_masked_samples() {
        let src = OwnedImage::from_fn(5, 5, |x, y| (x + y) as f32).unwrap();
        let mut tgt = src.clone();
        tgt.set(2, 2, 100.0);
        let mut mask = vec![1u8; 25];
        let geom = BlockGeometry::new(1, 1);
        let plan = SsdBlockPlan::from_block(src.view(), 1, 1, geom).unwrap();

        let mask_view = ImageView::from_slice(&mask, 5, 5).unwrap();
        let d = SsdMaskedScalar::score_at(tgt.view(), mask_view, &plan, 1, 1).unwrap();
        assert!((d - 96.0 * 96.0 / 9.0).abs() < 1e-3);

        mask[2 * 5 + 2] = 0;
        let mask_view = ImageView::from_slice(&mask, 5, 5).unwrap();
        let d = SsdMaskedScalar::score_at(tgt.view(), mask_view, &plan, 1, 1).unwrap();
        assert_eq!(d, 0.0);

        let none = vec![0u8; 25];
        let none_view = ImageView::from_slice(&none, 5, 5).unwrap();
        assert!(SsdMaskedScalar::score_at(tgt.view(), none_view, &plan, 1, 1).is_none());
    }
}
