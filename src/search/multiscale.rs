//! Maximal-PMCC search at a reduced scale.
//!
//! The source is downsampled, the target is smoothed to the same frequency
//! content and warped into the scaled, padded source frame, and the
//! single-scale search runs in that frame. Results are lifted back through
//! `1 / scale` and the approximate transform into full-resolution target
//! coordinates.

use crate::block::BlockGeometry;
use crate::image::filter::{
    downsample, fill_with_noise, gaussian_blur, normalize_contrast, smooth_for_scale,
};
use crate::image::mapping::map_inverse_interpolated;
use crate::image::{ImageView, OwnedImage};
use crate::point::{Correspondences, Point, PointMatch};
use crate::search::pmcc::PmccSearch;
use crate::search::{MatchConfig, Matcher, Metric};
use crate::trace::{trace_event, trace_span};
use crate::transform::{
    InvertibleCoordinateTransform, Similarity2D, TransformList, Translation2D,
};
use crate::util::math::scaled_radius;
use crate::util::BlockMatchResult;

/// Blur assumed present in an image at its own resolution.
const SOURCE_SIGMA: f32 = 0.5;
/// Blur the reduced images should carry at their own resolution.
const TARGET_SIGMA: f32 = 0.5;

/// Source and warped target, both at matching scale.
pub(crate) struct ScaledPair {
    pub(crate) source: OwnedImage,
    pub(crate) target: OwnedImage,
    pub(crate) block: BlockGeometry,
    pub(crate) search: BlockGeometry,
}

/// Builds the scaled source and the padded, warped, noise-filled target.
pub(crate) fn prepare_images(
    cfg: &MatchConfig,
    source: ImageView<'_, f32>,
    target: ImageView<'_, f32>,
    transform: &dyn InvertibleCoordinateTransform,
) -> BlockMatchResult<ScaledPair> {
    let _span = trace_span!("prepare_images").entered();
    let scale = cfg.scale;
    let block = BlockGeometry::new(
        scaled_radius(cfg.block_radius_x, scale),
        scaled_radius(cfg.block_radius_y, scale),
    );
    let search = BlockGeometry::new(
        scaled_radius(cfg.search_radius_x, scale),
        scaled_radius(cfg.search_radius_y, scale),
    );

    let mut scaled_source = downsample(source, scale, SOURCE_SIGMA, TARGET_SIGMA)?;
    normalize_contrast(&mut scaled_source);

    let mut smoothed_target = OwnedImage::from_view(target)?;
    smooth_for_scale(&mut smoothed_target, scale, SOURCE_SIGMA, TARGET_SIGMA);
    normalize_contrast(&mut smoothed_target);

    let mut warped = OwnedImage::filled(
        scaled_source.width() + 2 * search.radius_x,
        scaled_source.height() + 2 * search.radius_y,
        0.0,
    )?;
    fill_with_noise(&mut warped, cfg.noise_seed);

    let to_full = Similarity2D::scaling(1.0 / scale);
    let unpad = Translation2D::new(
        -(search.radius_x as f32) / scale,
        -(search.radius_y as f32) / scale,
    );
    let chain = TransformList::new()
        .then(&to_full)
        .then(&unpad)
        .then(transform);
    map_inverse_interpolated(&chain, smoothed_target.view(), &mut warped);

    gaussian_blur(&mut scaled_source, cfg.min_sigma);
    gaussian_blur(&mut warped, cfg.min_sigma);

    trace_event!(
        "scaled_geometry",
        scale = scale,
        block_radius_x = block.radius_x,
        block_radius_y = block.radius_y,
        search_radius_x = search.radius_x,
        search_radius_y = search.radius_y,
        width = scaled_source.width(),
        height = scaled_source.height()
    );

    Ok(ScaledPair {
        source: scaled_source,
        target: warped,
        block,
        search,
    })
}

pub(crate) fn match_by_maximal_pmcc(
    matcher: &Matcher,
    source: ImageView<'_, f32>,
    target: ImageView<'_, f32>,
    transform: &dyn InvertibleCoordinateTransform,
    points: &[Point],
) -> BlockMatchResult<Correspondences> {
    let cfg = matcher.config();
    cfg.validate(Metric::Pmcc)?;
    let _span = trace_span!(
        "match_pmcc_multiscale",
        points = points.len(),
        scale = cfg.scale
    )
    .entered();

    let scale = cfg.scale;
    let pair = prepare_images(cfg, source, target, transform)?;
    let scaled_points: Vec<Point> = points
        .iter()
        .map(|p| {
            let l = p.local();
            Point::new([l[0] * scale, l[1] * scale])
        })
        .collect();

    let search = PmccSearch::new(
        cfg,
        pair.source.view(),
        pair.target.view(),
        pair.block,
        pair.search,
    );
    let run = {
        let _span = trace_span!("match_pmcc", points = scaled_points.len()).entered();
        matcher.run_points(scaled_points.len(), |i| search.match_point(&scaled_points[i]))
    };

    trace_event!(
        "pmcc_matches",
        candidates = points.len(),
        accepted = run.accepted.len(),
        ambiguous = run.rejections.ambiguous,
        edge_response = run.rejections.edge_response,
        below_min_r = run.rejections.below_min_r,
        cancelled = run.cancelled
    );

    let matches = run
        .accepted
        .iter()
        .map(|&(i, m)| {
            let world = transform.apply([m[0] / scale, m[1] / scale]);
            PointMatch::new(points[i], Point::new(world))
        })
        .collect();
    Ok(Correspondences::new(matches, run.rejections, run.cancelled))
}
