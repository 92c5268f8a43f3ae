//! Source block plans precomputed once per candidate point.

use crate::block::stats::{block_mean, block_variance};
use crate::block::BlockGeometry;
use crate::image::ImageView;

/// Zero-mean source block and its statistics for correlation scoring.
#[derive(Clone, Debug)]
pub struct PmccBlockPlan {
    width: usize,
    height: usize,
    mean: f32,
    std: f32,
    zero_mean: Vec<f32>,
}

impl PmccBlockPlan {
    /// Builds a plan from the block anchored (top-left) at `(x0, y0)`.
    ///
    /// Returns `None` if the block leaves the image or its variance is not
    /// above `min_var` (a flat block carries nothing to correlate).
    pub fn from_block(
        source: ImageView<'_, f32>,
        x0: usize,
        y0: usize,
        geometry: BlockGeometry,
        min_var: f32,
    ) -> Option<Self> {
        let width = geometry.width();
        let height = geometry.height();
        if !source.contains_block(x0 as i64, y0 as i64, width, height) {
            return None;
        }

        let mean = block_mean(source, x0, y0, width, height);
        let variance = block_variance(source, x0, y0, width, height, mean);
        if !variance.is_finite() || variance <= min_var {
            return None;
        }

        let mut zero_mean = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let row = source.row(y)?;
            zero_mean.extend(row[x0..x0 + width].iter().map(|&v| v - mean));
        }

        Some(Self {
            width,
            height,
            mean,
            std: variance.sqrt(),
            zero_mean,
        })
    }

    /// Returns the block width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the block height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the source block.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the sample standard deviation of the source block.
    pub fn std(&self) -> f32 {
        self.std
    }

    /// Returns the zero-mean source block in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }
}

/// Source block samples with an explicit validity mask for SSD scoring.
#[derive(Clone, Debug)]
pub struct SsdBlockPlan {
    width: usize,
    height: usize,
    values: Vec<f32>,
    valid: Vec<u8>,
}

impl SsdBlockPlan {
    /// Captures the block anchored (top-left) at `(x0, y0)`.
    ///
    /// Non-finite source samples are marked invalid. Returns `None` if the
    /// block leaves the image.
    pub fn from_block(
        source: ImageView<'_, f32>,
        x0: usize,
        y0: usize,
        geometry: BlockGeometry,
    ) -> Option<Self> {
        let width = geometry.width();
        let height = geometry.height();
        if !source.contains_block(x0 as i64, y0 as i64, width, height) {
            return None;
        }

        let mut values = Vec::with_capacity(width * height);
        let mut valid = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let row = source.row(y)?;
            for &v in &row[x0..x0 + width] {
                let ok = v.is_finite();
                values.push(if ok { v } else { 0.0 });
                valid.push(u8::from(ok));
            }
        }

        Some(Self {
            width,
            height,
            values,
            valid,
        })
    }

    /// Returns the block width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the block height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the block samples in row-major order (invalid samples read 0).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the validity mask (`1` valid, `0` missing) in row-major order.
    pub fn valid(&self) -> &[u8] {
        &self.valid
    }
}
