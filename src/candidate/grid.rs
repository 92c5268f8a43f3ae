//! Candidate point layouts over a source image.

use crate::point::Point;
use crate::util::{BlockMatchError, BlockMatchResult};

/// Vertices of a triangular mesh lattice covering `[0, width] x [0, height]`.
///
/// Even rows hold `num_x` vertices spaced `dx = width / (num_x − 1)` apart;
/// odd rows hold `num_x − 1` vertices shifted by `dx / 2`. Row spacing starts
/// at `dx·√3/2` (equilateral triangles) and is stretched so the last row lands
/// on `height`. Points are returned row by row.
pub fn mesh_lattice_points(num_x: usize, width: f32, height: f32) -> BlockMatchResult<Vec<Point>> {
    if num_x < 2 {
        return Err(BlockMatchError::InvalidConfig {
            reason: "mesh lattice needs at least 2 vertices per row",
        });
    }
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(BlockMatchError::InvalidConfig {
            reason: "mesh lattice extent must be positive",
        });
    }

    let dx = width / (num_x - 1) as f32;
    let equilateral_dy = dx * 3.0f32.sqrt() * 0.5;
    let num_y = ((height / equilateral_dy).round() as usize + 1).max(2);
    let dy = height / (num_y - 1) as f32;

    let mut points = Vec::with_capacity(num_x * num_y);
    for j in 0..num_y {
        let y = j as f32 * dy;
        if j % 2 == 0 {
            points.extend((0..num_x).map(|i| Point::new([i as f32 * dx, y])));
        } else {
            points.extend((0..num_x - 1).map(|i| Point::new([(i as f32 + 0.5) * dx, y])));
        }
    }
    Ok(points)
}

/// Points on a regular grid with spacing `step`, kept `margin` pixels away
/// from every edge of a `width x height` image.
pub fn regular_grid_points(
    width: usize,
    height: usize,
    step: usize,
    margin: usize,
) -> BlockMatchResult<Vec<Point>> {
    if step == 0 {
        return Err(BlockMatchError::InvalidConfig {
            reason: "grid step must be positive",
        });
    }
    if 2 * margin >= width || 2 * margin >= height {
        return Ok(Vec::new());
    }

    let mut points = Vec::new();
    for y in (margin..height - margin).step_by(step) {
        for x in (margin..width - margin).step_by(step) {
            points.push(Point::new([x as f32, y as f32]));
        }
    }
    Ok(points)
}
