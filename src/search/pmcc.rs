//! Single-scale maximal-PMCC search.
//!
//! For each candidate point the source block is correlated against every
//! integer offset in the search window of a padded, pre-aligned target. The
//! response map is then screened by the maximum tests and the best maximum is
//! refined to sub-pixel precision.

use crate::block::{BlockGeometry, PmccBlockPlan};
use crate::candidate::nms::best_two_maxima;
use crate::candidate::response::ResponseMap;
use crate::image::ImageView;
use crate::kernel::Kernel;
use crate::point::Point;
use crate::refine::quad2d::localize_subpixel;
use crate::search::{MatchConfig, Rejection, RejectionParams};

#[cfg(not(feature = "simd"))]
type PmccKernel = crate::kernel::scalar::PmccScalar;
#[cfg(feature = "simd")]
type PmccKernel = crate::kernel::simd::PmccSimd;

/// One PMCC search setup shared by all candidate points.
pub(crate) struct PmccSearch<'a> {
    source: ImageView<'a, f32>,
    target: ImageView<'a, f32>,
    block: BlockGeometry,
    search: BlockGeometry,
    min_r: f32,
    rejection: RejectionParams,
    min_var: f32,
}

impl<'a> PmccSearch<'a> {
    pub(crate) fn from_config(
        cfg: &MatchConfig,
        source: ImageView<'a, f32>,
        target: ImageView<'a, f32>,
    ) -> Self {
        Self::new(
            cfg,
            source,
            target,
            BlockGeometry::new(cfg.block_radius_x, cfg.block_radius_y),
            BlockGeometry::new(cfg.search_radius_x, cfg.search_radius_y),
        )
    }

    /// Uses explicit block and search radii in place of the configured ones.
    pub(crate) fn new(
        cfg: &MatchConfig,
        source: ImageView<'a, f32>,
        target: ImageView<'a, f32>,
        block: BlockGeometry,
        search: BlockGeometry,
    ) -> Self {
        Self {
            source,
            target,
            block,
            search,
            min_r: cfg.min_r,
            rejection: cfg.rejection,
            min_var: cfg.min_var,
        }
    }

    /// Correlation response of the block anchored at `(x0, y0)` over the
    /// search window. Offset `(ix − rx, iy − ry)` compares against the target
    /// block anchored at `(x0 + ix, y0 + iy)`.
    pub(crate) fn response_map(&self, plan: &PmccBlockPlan, x0: usize, y0: usize) -> ResponseMap {
        let mut map = ResponseMap::new(self.search.radius_x, self.search.radius_y);
        for iy in 0..map.height() {
            for ix in 0..map.width() {
                let r = PmccKernel::score_at(self.target, plan, x0 + ix, y0 + iy, self.min_var);
                map.set(ix, iy, r);
            }
        }
        map
    }

    /// Matched position of `point` in the unpadded source frame.
    pub(crate) fn match_point(&self, point: &Point) -> Result<[f32; 2], Rejection> {
        let local = point.local();
        let (x0, y0) = self
            .block
            .origin_at(local)
            .ok_or(Rejection::OutOfBounds)?;
        if !self
            .source
            .contains_block(x0, y0, self.block.width(), self.block.height())
        {
            return Err(Rejection::OutOfBounds);
        }
        let (x0, y0) = (x0 as usize, y0 as usize);

        let plan = PmccBlockPlan::from_block(self.source, x0, y0, self.block, self.min_var)
            .ok_or(Rejection::DegenerateBlock)?;
        let map = self.response_map(&plan, x0, y0);

        let maxima = best_two_maxima(&map);
        let best = maxima.best.ok_or(Rejection::NoMaximum)?;
        if best.score < self.min_r {
            return Err(Rejection::BelowMinR);
        }
        if let Some(second) = maxima.second_best {
            if second >= 0.0 && second / best.score > self.rejection.rod {
                return Err(Rejection::Ambiguous);
            }
        }

        let (ox, oy) = localize_subpixel(
            map.neighborhood(best.x, best.y),
            self.rejection.max_curvature_ratio(),
        )?;
        let (dx, dy) = map.offset_of(best.x, best.y);
        Ok([local[0] + dx as f32 + ox, local[1] + dy as f32 + oy])
    }
}
