use blockmatch::{
    BlockMatchError, Identity2D, MatchConfig, Matcher, OwnedImage, Point, RejectionParams,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const WAVES: [(f32, f32, f32); 5] = [
    (0.31, 0.17, 0.0),
    (-0.23, 0.41, 1.3),
    (0.47, -0.29, 2.1),
    (0.11, 0.53, 0.7),
    (0.6, 0.2, 0.4),
];

fn texture(width: usize, height: usize, dx: f32, dy: f32) -> OwnedImage {
    OwnedImage::from_fn(width, height, |x, y| {
        let fx = x as f32 - dx;
        let fy = y as f32 - dy;
        WAVES.iter().map(|&(a, b, c)| (a * fx + b * fy + c).sin()).sum()
    })
    .unwrap()
}

/// Integer pattern repeating every 5 pixels along both axes.
fn periodic(width: usize, height: usize, shift: usize) -> OwnedImage {
    OwnedImage::from_fn(width, height, |x, y| {
        let (x, y) = (x + 5 - shift % 5, y + 5 - shift % 5);
        (((x % 5) * 3 + (y % 5) * 7) % 11) as f32
    })
    .unwrap()
}

fn interior_points() -> Vec<Point> {
    (0..5)
        .flat_map(|j| (0..5).map(move |i| Point::new([24.0 + 8.0 * i as f32, 24.0 + 8.0 * j as f32])))
        .collect()
}

fn config(block_radius: usize, search_radius: usize) -> MatchConfig {
    MatchConfig {
        block_radius_x: block_radius,
        block_radius_y: block_radius,
        search_radius_x: search_radius,
        search_radius_y: search_radius,
        ..MatchConfig::default()
    }
}

#[test]
fn far_away_points_are_counted_out_of_bounds() {
    let sr = 3;
    let src = texture(48, 48, 0.0, 0.0);
    let padded = texture(48 + 2 * sr, 48 + 2 * sr, sr as f32, sr as f32);
    let points = [
        Point::new([-1e30, 24.0]),
        Point::new([24.0, 24.0]),
        Point::new([24.0, f32::NEG_INFINITY]),
        Point::new([f32::NAN, 24.0]),
    ];
    let matcher = Matcher::new(config(8, sr));
    let found = matcher
        .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.as_slice()[0].source, points[1]);
    assert_eq!(found.rejections.out_of_bounds, 3);

    let found = matcher
        .match_by_maximal_pmcc(src.view(), src.view(), &Identity2D, &points)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.rejections.out_of_bounds, 3);
}

#[test]
fn single_scale_recovers_subpixel_translation() {
    let sr = 5;
    let src = texture(80, 80, 0.0, 0.0);
    let points = interior_points();
    let matcher = Matcher::new(config(8, sr));

    for (dx, dy) in [(3.0f32, -2.0f32), (-1.5, 2.25)] {
        let padded = texture(80 + 2 * sr, 80 + 2 * sr, sr as f32 + dx, sr as f32 + dy);
        let found = matcher
            .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
            .unwrap();
        assert_eq!(found.len(), points.len());
        for m in &found {
            let [ex, ey] = m.displacement();
            assert!((ex - dx).abs() < 0.1, "dx {ex} vs {dx}");
            assert!((ey - dy).abs() < 0.1, "dy {ey} vs {dy}");
        }
    }
}

#[test]
fn repeated_pattern_is_rejected_as_ambiguous() {
    let sr = 6;
    let src = periodic(60, 60, 0);
    let padded = periodic(60 + 2 * sr, 60 + 2 * sr, sr);
    let points = vec![
        Point::new([20.0, 20.0]),
        Point::new([30.0, 25.0]),
        Point::new([40.0, 33.0]),
    ];

    let matcher = Matcher::new(config(4, sr));
    let found = matcher
        .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(found.rejections.ambiguous, points.len());

    // Equal maxima pass once the ratio test allows a tie; the first maximum
    // in scan order wins, one period away from the true offset.
    let tolerant = Matcher::new(MatchConfig {
        rejection: RejectionParams {
            rod: 1.0,
            ..RejectionParams::default()
        },
        ..config(4, sr)
    });
    let found = tolerant
        .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
        .unwrap();
    assert_eq!(found.len(), points.len());
    for m in &found {
        let [dx, dy] = m.displacement();
        assert!((dx / 5.0 - (dx / 5.0).round()).abs() < 0.01, "dx {dx}");
        assert!((dy / 5.0 - (dy / 5.0).round()).abs() < 0.01, "dy {dy}");
    }
}

#[test]
fn edge_like_peak_is_rejected() {
    let sr = 3;
    let stripes = |width: usize, height: usize, shift: f32| {
        OwnedImage::from_fn(width, height, |x, y| {
            let fx = x as f32 - shift;
            let fy = y as f32 - shift;
            (0.5 * fx).sin() + (0.23 * fx + 1.0).sin() + 0.05 * (0.3 * fy).sin()
        })
        .unwrap()
    };
    let src = stripes(60, 60, 0.0);
    let padded = stripes(60 + 2 * sr, 60 + 2 * sr, sr as f32);
    let points = vec![
        Point::new([20.0, 20.0]),
        Point::new([30.0, 30.0]),
        Point::new([25.0, 40.0]),
    ];

    let matcher = Matcher::new(config(5, sr));
    let found = matcher
        .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(found.rejections.edge_response, points.len());
}

#[test]
fn border_and_flat_points_are_rejected() {
    let sr = 3;
    let mut src = texture(60, 60, 0.0, 0.0);
    for y in 30..45 {
        for x in 30..45 {
            src.set(x, y, 0.5);
        }
    }
    let padded = texture(60 + 2 * sr, 60 + 2 * sr, sr as f32, sr as f32);
    let points = vec![
        Point::new([3.0, 20.0]),
        Point::new([20.0, 57.0]),
        Point::new([37.0, 37.0]),
        Point::new([18.0, 18.0]),
    ];

    let matcher = Matcher::new(config(5, sr));
    let found = matcher
        .match_by_maximal_pmcc_single_scale(src.view(), padded.view(), &points)
        .unwrap();
    assert_eq!(found.rejections.out_of_bounds, 2);
    assert_eq!(found.rejections.degenerate_block, 1);
    assert_eq!(found.len(), 1);
    assert_eq!(found.as_slice()[0].source, points[3]);
}

#[test]
fn correlation_requires_positive_search_radius() {
    let img = texture(40, 40, 0.0, 0.0);
    let matcher = Matcher::new(config(4, 0));
    let err = matcher
        .match_by_maximal_pmcc_single_scale(img.view(), img.view(), &[Point::new([20.0, 20.0])])
        .err()
        .unwrap();
    assert!(matches!(err, BlockMatchError::InvalidConfig { .. }));
}

#[test]
fn cancelled_run_returns_partial_result() {
    let src = texture(80, 80, 0.0, 0.0);
    let tgt = texture(80, 80, 1.0, 1.0);
    let points = interior_points();

    let flag = Arc::new(AtomicBool::new(true));
    let matcher = Matcher::new(config(8, 4)).with_cancel_flag(flag.clone());
    let found = matcher
        .match_by_maximal_pmcc(src.view(), tgt.view(), &Identity2D, &points)
        .unwrap();
    assert!(found.cancelled);
    assert!(found.is_empty());

    flag.store(false, Ordering::Relaxed);
    let found = matcher
        .match_by_maximal_pmcc(src.view(), tgt.view(), &Identity2D, &points)
        .unwrap();
    assert!(!found.cancelled);
    assert_eq!(found.len(), points.len());
}

#[test]
fn progress_reports_every_point() {
    let src = texture(80, 80, 0.0, 0.0);
    let points = interior_points();
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));

    let (calls_cb, last_cb) = (calls.clone(), last.clone());
    let matcher = Matcher::new(config(6, 2)).with_progress(move |done, total| {
        assert!(done <= total);
        calls_cb.fetch_add(1, Ordering::Relaxed);
        last_cb.fetch_max(done, Ordering::Relaxed);
    });
    matcher
        .match_by_minimal_square_difference(src.view(), src.view(), &Identity2D, &points)
        .unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), points.len());
    assert_eq!(last.load(Ordering::Relaxed), points.len());
}
