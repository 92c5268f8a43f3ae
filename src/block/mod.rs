//! Block geometry, block statistics and per-point source block plans.
//!
//! A block is the `(2·rx + 1) x (2·ry + 1)` window centered on a candidate
//! pixel. Plans capture the source side of a block once per candidate point so
//! the search loop only touches target samples.

mod plan;
pub mod stats;

pub use plan::{PmccBlockPlan, SsdBlockPlan};

use crate::util::math::round_half_up;

/// Radii of a square-centered block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGeometry {
    pub radius_x: usize,
    pub radius_y: usize,
}

impl BlockGeometry {
    pub fn new(radius_x: usize, radius_y: usize) -> Self {
        Self { radius_x, radius_y }
    }

    /// Block width in pixels, `2·rx + 1`.
    pub fn width(&self) -> usize {
        2 * self.radius_x + 1
    }

    /// Block height in pixels, `2·ry + 1`.
    pub fn height(&self) -> usize {
        2 * self.radius_y + 1
    }

    /// Number of samples in the block.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Top-left corner of the block centered on the pixel nearest `center`.
    ///
    /// Returns `None` for non-finite centers or when the corner is not
    /// representable.
    pub fn origin_at(&self, center: [f32; 2]) -> Option<(i64, i64)> {
        if !center[0].is_finite() || !center[1].is_finite() {
            return None;
        }
        let x0 = round_half_up(center[0]).checked_sub(i64::try_from(self.radius_x).ok()?)?;
        let y0 = round_half_up(center[1]).checked_sub(i64::try_from(self.radius_y).ok()?)?;
        Some((x0, y0))
    }
}
