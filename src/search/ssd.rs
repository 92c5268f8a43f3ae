//! Minimal square-difference search against a pre-warped target.
//!
//! The target is resampled into the source frame, padded by the search radius,
//! so that buffer pixel `u` holds `target(transform(u − r))`. Samples with no
//! pre-image are marked missing and ignored by the block difference.

use crate::block::{BlockGeometry, SsdBlockPlan};
use crate::image::filter::normalize_contrast;
use crate::image::mapping::map_inverse_interpolated;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::scalar::SsdMaskedScalar;
use crate::point::{Correspondences, Point, PointMatch};
use crate::search::{Matcher, Metric, Rejection};
use crate::trace::{trace_event, trace_span};
use crate::transform::{InvertibleCoordinateTransform, TransformList, Translation2D};
use crate::util::BlockMatchResult;

pub(crate) fn match_by_minimal_square_difference(
    matcher: &Matcher,
    source: ImageView<'_, f32>,
    target: ImageView<'_, f32>,
    transform: &dyn InvertibleCoordinateTransform,
    points: &[Point],
) -> BlockMatchResult<Correspondences> {
    let cfg = matcher.config();
    cfg.validate(Metric::SquareDifference)?;
    let _span = trace_span!("match_ssd", points = points.len()).entered();

    let block = BlockGeometry::new(cfg.block_radius_x, cfg.block_radius_y);
    let srx = cfg.search_radius_x;
    let sry = cfg.search_radius_y;

    let mut source = OwnedImage::from_view(source)?;
    normalize_contrast(&mut source);
    let mut target = OwnedImage::from_view(target)?;
    normalize_contrast(&mut target);

    let shift = Translation2D::new(-(srx as f32), -(sry as f32));
    let chain = TransformList::new().then(&shift).then(transform);
    let mut warped = OwnedImage::filled(
        source.width() + 2 * srx,
        source.height() + 2 * sry,
        f32::NAN,
    )?;
    let mut mask = map_inverse_interpolated(&chain, target.view(), &mut warped);
    for (m, v) in mask.iter_mut().zip(warped.data()) {
        if !v.is_finite() {
            *m = 0;
        }
    }
    let mask = ImageView::from_slice(&mask, warped.width(), warped.height())?;

    let source = source.view();
    let warped = warped.view();
    let run = matcher.run_points(points.len(), |i| {
        let local = points[i].local();
        let (dx, dy) = best_offset(source, warped, mask, block, srx, sry, local)?;
        Ok(transform.apply([local[0] + dx as f32, local[1] + dy as f32]))
    });

    trace_event!(
        "ssd_matches",
        candidates = points.len(),
        accepted = run.accepted.len(),
        out_of_bounds = run.rejections.out_of_bounds,
        cancelled = run.cancelled
    );

    let matches = run
        .accepted
        .iter()
        .map(|&(i, t)| PointMatch::new(points[i], Point::new(t)))
        .collect();
    Ok(Correspondences::new(matches, run.rejections, run.cancelled))
}

/// Integer offset in `[-sr, sr]²` minimizing the masked block difference.
///
/// Ties keep the first offset in row-major scan order. If no offset has a
/// single valid sample pair, the zero offset is returned.
fn best_offset(
    source: ImageView<'_, f32>,
    warped: ImageView<'_, f32>,
    mask: ImageView<'_, u8>,
    block: BlockGeometry,
    srx: usize,
    sry: usize,
    local: [f32; 2],
) -> Result<(i64, i64), Rejection> {
    let (x0, y0) = block.origin_at(local).ok_or(Rejection::OutOfBounds)?;
    if !source.contains_block(x0, y0, block.width(), block.height()) {
        return Err(Rejection::OutOfBounds);
    }
    let (x0, y0) = (x0 as usize, y0 as usize);
    let plan = SsdBlockPlan::from_block(source, x0, y0, block).ok_or(Rejection::OutOfBounds)?;

    let mut best: Option<(f32, i64, i64)> = None;
    for iy in 0..=2 * sry {
        for ix in 0..=2 * srx {
            let Some(d) = SsdMaskedScalar::score_at(warped, mask, &plan, x0 + ix, y0 + iy) else {
                continue;
            };
            if best.is_none_or(|(b, _, _)| d < b) {
                best = Some((d, ix as i64 - srx as i64, iy as i64 - sry as i64));
            }
        }
    }
    Ok(best.map_or((0, 0), |(_, dx, dy)| (dx, dy)))
}
