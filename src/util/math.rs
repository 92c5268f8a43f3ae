//! Numeric helpers shared by the matchers.

/// Rounds to the nearest integer, breaking ties toward positive infinity.
///
/// Candidate points snap to the pixel grid with this rule so that `-0.5`
/// lands on `0` and `0.5` lands on `1`.
pub(crate) fn round_half_up(value: f32) -> i64 {
    (value + 0.5).floor() as i64
}

/// Scales an integer radius and rounds it up.
pub(crate) fn scaled_radius(radius: usize, scale: f32) -> usize {
    (radius as f32 * scale).ceil().max(0.0) as usize
}

/// Gaussian σ needed to take an image sampled at `source_sigma` to
/// `target_sigma` after reducing it by `scale`.
///
/// Returns zero when no additional smoothing is needed.
pub(crate) fn sigma_for_scale(scale: f32, source_sigma: f32, target_sigma: f32) -> f32 {
    let target = target_sigma / scale;
    let sq = target * target - source_sigma * source_sigma;
    if sq > 0.0 {
        sq.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{round_half_up, scaled_radius, sigma_for_scale};

    #[test]
    fn round_half_up_breaks_ties_upward() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(2.49), 2);
    }

    #[test]
    fn scaled_radius_rounds_up() {
        assert_eq!(scaled_radius(10, 0.25), 3);
        assert_eq!(scaled_radius(8, 0.25), 2);
        assert_eq!(scaled_radius(7, 1.0), 7);
    }

    #[test]
    fn sigma_for_scale_vanishes_at_full_resolution() {
        assert_eq!(sigma_for_scale(1.0, 0.5, 0.5), 0.0);
        let sigma = sigma_for_scale(0.5, 0.5, 0.5);
        assert!((sigma - 0.75f32.sqrt()).abs() < 1e-6);
    }
}
