//! Block-correspondence search.
//!
//! [`Matcher`] runs one of three searches over a list of candidate points:
//!
//! * minimal square difference against a target pre-warped by the
//!   approximate transform,
//! * maximal PMCC at a single scale against an already aligned, padded target,
//! * maximal PMCC at a reduced scale, re-expressed in full-resolution world
//!   coordinates.
//!
//! Points are independent. With the `rayon` feature and
//! [`MatchConfig::parallel`] set, they are processed in parallel and merged
//! back in input order, so results do not depend on the execution mode.

use crate::point::{Correspondences, Point, PointMatch};
use crate::transform::InvertibleCoordinateTransform;
use crate::util::{BlockMatchError, BlockMatchResult};
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "rayon")]
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

pub(crate) mod multiscale;
pub(crate) mod pmcc;
pub(crate) mod ssd;

/// Similarity metric used by a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Pearson product-moment correlation coefficient (maximized).
    Pmcc,
    /// Mean squared intensity difference (minimized).
    SquareDifference,
}

/// Thresholds of the maximum rejection tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RejectionParams {
    /// Ratio of second-best to best response above which a match is ambiguous.
    pub rod: f32,
    /// Largest accepted ratio of principal curvatures of the response peak.
    pub max_curvature: f32,
}

impl RejectionParams {
    /// `(κ + 1)² / κ` for curvature threshold `κ`.
    pub fn max_curvature_ratio(&self) -> f32 {
        let k = self.max_curvature;
        (k + 1.0) * (k + 1.0) / k
    }
}

impl Default for RejectionParams {
    fn default() -> Self {
        Self {
            rod: 0.9,
            max_curvature: 10.0,
        }
    }
}

/// Configuration for a block-matching run.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Horizontal block radius; blocks are `2·rx + 1` wide.
    pub block_radius_x: usize,
    /// Vertical block radius; blocks are `2·ry + 1` high.
    pub block_radius_y: usize,
    /// Largest horizontal offset searched.
    pub search_radius_x: usize,
    /// Largest vertical offset searched.
    pub search_radius_y: usize,
    /// Smallest accepted correlation coefficient.
    pub min_r: f32,
    /// Matching scale in `(0, 1]` for the multi-scale PMCC search.
    pub scale: f32,
    /// Ambiguity and curvature thresholds.
    pub rejection: RejectionParams,
    /// σ of the anti-aliasing blur applied before correlating at scale.
    pub min_sigma: f32,
    /// Block variance at or below which a block counts as flat.
    pub min_var: f32,
    /// Seed for the noise that fills unmapped target pixels.
    pub noise_seed: u64,
    /// Process candidate points in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            block_radius_x: 8,
            block_radius_y: 8,
            search_radius_x: 8,
            search_radius_y: 8,
            min_r: 0.7,
            scale: 1.0,
            rejection: RejectionParams::default(),
            min_sigma: 2.31f32.sqrt(),
            min_var: 1e-12,
            noise_seed: 0x5eed,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks the parameters used by a search with `metric`.
    pub fn validate(&self, metric: Metric) -> BlockMatchResult<()> {
        if self.block_radius_x == 0 || self.block_radius_y == 0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "block radii must be positive",
            });
        }
        if metric == Metric::SquareDifference {
            return Ok(());
        }

        if self.search_radius_x == 0 || self.search_radius_y == 0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "correlation search radii must be positive",
            });
        }
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 1.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "scale must be in (0, 1]",
            });
        }
        if !self.min_r.is_finite() || self.min_r > 1.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "min_r must be finite and at most 1",
            });
        }
        let rod = self.rejection.rod;
        if !rod.is_finite() || rod <= 0.0 || rod > 1.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "rod must be in (0, 1]",
            });
        }
        let k = self.rejection.max_curvature;
        if !k.is_finite() || k <= 0.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "max_curvature must be positive",
            });
        }
        if !self.min_sigma.is_finite() || self.min_sigma < 0.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "min_sigma must be non-negative",
            });
        }
        if !self.min_var.is_finite() || self.min_var < 0.0 {
            return Err(BlockMatchError::InvalidConfig {
                reason: "min_var must be non-negative",
            });
        }
        Ok(())
    }
}

/// Why a candidate point produced no correspondence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The source block leaves the source image.
    OutOfBounds,
    /// The source block is flat.
    DegenerateBlock,
    /// The response map has no strict interior local maximum.
    NoMaximum,
    /// The best response is below `min_r`.
    BelowMinR,
    /// A second maximum is nearly as good as the best one.
    Ambiguous,
    /// The response peak is elongated or singular.
    EdgeResponse,
    /// A neighbor of the best maximum has an undefined response.
    UndefinedNeighborhood,
    /// The sub-pixel offset leaves the one-pixel trust region.
    OutsideTrustRegion,
}

/// Number of rejected candidate points per reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub out_of_bounds: usize,
    pub degenerate_block: usize,
    pub no_maximum: usize,
    pub below_min_r: usize,
    pub ambiguous: usize,
    pub edge_response: usize,
    pub undefined_neighborhood: usize,
    pub outside_trust_region: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        let slot = match rejection {
            Rejection::OutOfBounds => &mut self.out_of_bounds,
            Rejection::DegenerateBlock => &mut self.degenerate_block,
            Rejection::NoMaximum => &mut self.no_maximum,
            Rejection::BelowMinR => &mut self.below_min_r,
            Rejection::Ambiguous => &mut self.ambiguous,
            Rejection::EdgeResponse => &mut self.edge_response,
            Rejection::UndefinedNeighborhood => &mut self.undefined_neighborhood,
            Rejection::OutsideTrustRegion => &mut self.outside_trust_region,
        };
        *slot += 1;
    }

    /// Total number of rejected points.
    pub fn total(&self) -> usize {
        self.out_of_bounds
            + self.degenerate_block
            + self.no_maximum
            + self.below_min_r
            + self.ambiguous
            + self.edge_response
            + self.undefined_neighborhood
            + self.outside_trust_region
    }
}

type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Per-point results of a run, in candidate order, before assembly.
pub(crate) struct PointRun<T> {
    pub(crate) accepted: Vec<(usize, T)>,
    pub(crate) rejections: RejectionCounts,
    pub(crate) cancelled: bool,
}

/// Block-correspondence matcher.
#[derive(Clone)]
pub struct Matcher {
    cfg: MatchConfig,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Arc<ProgressFn>>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl Matcher {
    /// Creates a matcher with the given configuration.
    pub fn new(cfg: MatchConfig) -> Self {
        Self {
            cfg,
            cancel: None,
            progress: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Stops a run before the next candidate point once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Calls `progress(done, total)` after each processed candidate point.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Matches `points` by minimal mean squared difference.
    ///
    /// `transform` maps source coordinates approximately onto `target`. Every
    /// point whose block lies inside `source` yields exactly one match whose
    /// target is `transform(local + best_offset)`.
    pub fn match_by_minimal_square_difference(
        &self,
        source: ImageView<'_, f32>,
        target: ImageView<'_, f32>,
        transform: &dyn InvertibleCoordinateTransform,
        points: &[Point],
    ) -> BlockMatchResult<Correspondences> {
        ssd::match_by_minimal_square_difference(self, source, target, transform, points)
    }

    /// Matches `points` by maximal PMCC at [`MatchConfig::scale`].
    ///
    /// `transform` maps source coordinates approximately onto `target`.
    /// Returned targets are `transform(matched / scale)` in full-resolution
    /// world coordinates; sources are the original points.
    pub fn match_by_maximal_pmcc(
        &self,
        source: ImageView<'_, f32>,
        target: ImageView<'_, f32>,
        transform: &dyn InvertibleCoordinateTransform,
        points: &[Point],
    ) -> BlockMatchResult<Correspondences> {
        multiscale::match_by_maximal_pmcc(self, source, target, transform, points)
    }

    /// Matches `points` by maximal PMCC without rescaling or warping.
    ///
    /// `target` must already be in the source frame, padded by the search
    /// radius on every side: source pixel `(x, y)` corresponds to target pixel
    /// `(x + search_radius_x, y + search_radius_y)`. Returned targets are
    /// `local + offset + sub-pixel correction` in the unpadded source frame.
    pub fn match_by_maximal_pmcc_single_scale(
        &self,
        source: ImageView<'_, f32>,
        padded_target: ImageView<'_, f32>,
        points: &[Point],
    ) -> BlockMatchResult<Correspondences> {
        self.cfg.validate(Metric::Pmcc)?;
        let search = pmcc::PmccSearch::from_config(&self.cfg, source, padded_target);
        let run = self.run_points(points.len(), |i| search.match_point(&points[i]));
        let matches = run
            .accepted
            .iter()
            .map(|&(i, t)| PointMatch::new(points[i], Point::new(t)))
            .collect();
        Ok(Correspondences::new(matches, run.rejections, run.cancelled))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn report(&self, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
    }

    /// Evaluates `eval` for every candidate index, honoring cancellation.
    pub(crate) fn run_points<T, F>(&self, total: usize, eval: F) -> PointRun<T>
    where
        T: Send,
        F: Fn(usize) -> Result<T, Rejection> + Sync,
    {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return self.run_points_par(total, eval);
        }

        let mut run = PointRun {
            accepted: Vec::new(),
            rejections: RejectionCounts::default(),
            cancelled: false,
        };
        for i in 0..total {
            if self.is_cancelled() {
                run.cancelled = true;
                break;
            }
            match eval(i) {
                Ok(value) => run.accepted.push((i, value)),
                Err(rejection) => run.rejections.record(rejection),
            }
            self.report(i + 1, total);
        }
        run
    }

    #[cfg(feature = "rayon")]
    fn run_points_par<T, F>(&self, total: usize, eval: F) -> PointRun<T>
    where
        T: Send,
        F: Fn(usize) -> Result<T, Rejection> + Sync,
    {
        let done = AtomicUsize::new(0);
        let outcomes: Vec<Option<Result<T, Rejection>>> = (0..total)
            .into_par_iter()
            .map(|i| {
                if self.is_cancelled() {
                    return None;
                }
                let outcome = eval(i);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(finished, total);
                Some(outcome)
            })
            .collect();

        let mut run = PointRun {
            accepted: Vec::new(),
            rejections: RejectionCounts::default(),
            cancelled: false,
        };
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Some(Ok(value)) => run.accepted.push((i, value)),
                Some(Err(rejection)) => run.rejections.record(rejection),
                None => run.cancelled = true,
            }
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchConfig, Metric, RejectionCounts, RejectionParams, Rejection};

    #[test]
    fn default_curvature_ratio() {
        let ratio = RejectionParams::default().max_curvature_ratio();
        assert!((ratio - 12.1).abs() < 1e-5);
    }

    #[test]
    fn square_difference_allows_zero_search_radius() {
        let cfg = MatchConfig {
            search_radius_x: 0,
            search_radius_y: 0,
            ..MatchConfig::default()
        };
        assert!(cfg.validate(Metric::SquareDifference).is_ok());
        assert!(cfg.validate(Metric::Pmcc).is_err());
    }

    #[test]
    fn counts_accumulate_per_reason() {
        let mut counts = RejectionCounts::default();
        counts.record(Rejection::Ambiguous);
        counts.record(Rejection::Ambiguous);
        counts.record(Rejection::OutOfBounds);
        assert_eq!(counts.ambiguous, 2);
        assert_eq!(counts.total(), 3);
    }
}
