#![cfg(feature = "rayon")]

use blockmatch::{
    mesh_lattice_points, MatchConfig, Matcher, OwnedImage, Similarity2D, Translation2D,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn make_image(width: usize, height: usize, dx: f32, dy: f32) -> OwnedImage {
    OwnedImage::from_fn(width, height, |x, y| {
        let fx = x as f32 - dx;
        let fy = y as f32 - dy;
        (fx * 0.31 + fy * 0.17).sin() + (fx * 0.47 - fy * 0.29 + 2.1).sin()
            + 0.5 * ((x * 7 + y * 13) % 5) as f32
    })
    .unwrap()
}

fn configs() -> (MatchConfig, MatchConfig) {
    let seq = MatchConfig {
        block_radius_x: 7,
        block_radius_y: 7,
        search_radius_x: 4,
        search_radius_y: 4,
        scale: 0.75,
        parallel: false,
        ..MatchConfig::default()
    };
    let par = MatchConfig {
        parallel: true,
        ..seq.clone()
    };
    (seq, par)
}

#[test]
fn parallel_matches_sequential_pmcc() {
    let src = make_image(120, 96, 0.0, 0.0);
    let tgt = make_image(120, 96, 2.0, -1.0);
    let points = mesh_lattice_points(12, 119.0, 95.0).unwrap();
    let approx = Similarity2D::new(1.0, 0.01, 1.5, -0.5);

    let (seq_cfg, par_cfg) = configs();
    let seq = Matcher::new(seq_cfg)
        .match_by_maximal_pmcc(src.view(), tgt.view(), &approx, &points)
        .unwrap();
    let par = Matcher::new(par_cfg)
        .match_by_maximal_pmcc(src.view(), tgt.view(), &approx, &points)
        .unwrap();

    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn parallel_matches_sequential_square_difference() {
    let src = make_image(120, 96, 0.0, 0.0);
    let tgt = make_image(120, 96, 3.0, 2.0);
    let points = mesh_lattice_points(10, 119.0, 95.0).unwrap();
    let approx = Translation2D::new(2.0, 2.0);

    let (seq_cfg, par_cfg) = configs();
    let seq = Matcher::new(seq_cfg)
        .match_by_minimal_square_difference(src.view(), tgt.view(), &approx, &points)
        .unwrap();
    let par = Matcher::new(par_cfg)
        .match_by_minimal_square_difference(src.view(), tgt.view(), &approx, &points)
        .unwrap();

    assert_eq!(seq, par);
}

#[test]
fn parallel_progress_counts_every_point() {
    let src = make_image(96, 96, 0.0, 0.0);
    let points = mesh_lattice_points(8, 95.0, 95.0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_cb = calls.clone();

    let (_, par_cfg) = configs();
    Matcher::new(par_cfg)
        .with_progress(move |_, _| {
            calls_cb.fetch_add(1, Ordering::Relaxed);
        })
        .match_by_minimal_square_difference(
            src.view(),
            src.view(),
            &Translation2D::new(0.0, 0.0),
            &points,
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), points.len());
}
