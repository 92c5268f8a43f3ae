//! Second-order (Taylor) localization of a 2D response maximum.
//!
//! Derivatives come from finite differences on the 3x3 neighborhood `s`
//! centered at `s[1][1]`, with `s[row][col]` and rows running along `y`.
//! The quadratic model is trusted only if its Hessian is not edge-like and the
//! resulting offset stays within one pixel of the discrete maximum.

use crate::search::Rejection;

/// Gradient and Hessian of a response surface at a grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hessian2D {
    pub dx: f32,
    pub dy: f32,
    pub dxx: f32,
    pub dyy: f32,
    pub dxy: f32,
}

impl Hessian2D {
    /// Central differences over a 3x3 neighborhood.
    pub fn from_neighborhood(s: [[f32; 3]; 3]) -> Self {
        let c11 = s[1][1];
        Self {
            dx: (s[1][2] - s[1][0]) / 2.0,
            dy: (s[2][1] - s[0][1]) / 2.0,
            dxx: s[1][0] - c11 - c11 + s[1][2],
            dyy: s[0][1] - c11 - c11 + s[2][1],
            dxy: (s[2][2] - s[2][0] - s[0][2] + s[0][0]) / 4.0,
        }
    }

    pub fn det(&self) -> f32 {
        self.dxx * self.dyy - self.dxy * self.dxy
    }

    pub fn trace(&self) -> f32 {
        self.dxx + self.dyy
    }

    /// Curvature test: rejects a singular Hessian or one whose
    /// `trace² / det` exceeds `max_curvature_ratio`.
    pub fn is_well_localized(&self, max_curvature_ratio: f32) -> bool {
        let det = self.det();
        if det == 0.0 {
            return false;
        }
        let trace = self.trace();
        trace * trace / det <= max_curvature_ratio
    }

    /// Offset `−H⁻¹·∇` to the stationary point of the quadratic model.
    pub fn taylor_offset(&self) -> Option<(f32, f32)> {
        let det = self.det();
        if det == 0.0 {
            return None;
        }
        let ixx = self.dyy / det;
        let ixy = -self.dxy / det;
        let iyy = self.dxx / det;
        let ox = -ixx * self.dx - ixy * self.dy;
        let oy = -ixy * self.dx - iyy * self.dy;
        Some((ox, oy))
    }
}

/// Runs the curvature test and Taylor localization on a maximum's neighborhood.
///
/// Returns the sub-pixel offset `(ox, oy)` with `|ox| < 1` and `|oy| < 1`.
pub fn localize_subpixel(s: [[f32; 3]; 3], max_curvature_ratio: f32) -> Result<(f32, f32), Rejection> {
    if s.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Rejection::UndefinedNeighborhood);
    }

    let hessian = Hessian2D::from_neighborhood(s);
    if !hessian.is_well_localized(max_curvature_ratio) {
        return Err(Rejection::EdgeResponse);
    }

    match hessian.taylor_offset() {
        Some((ox, oy)) if ox.abs() < 1.0 && oy.abs() < 1.0 => Ok((ox, oy)),
        _ => Err(Rejection::OutsideTrustRegion),
    }
}

#[cfg(test)]
mod tests {
    use super::{localize_subpixel, Hessian2D};
    use crate::search::Rejection;

    const RATIO: f32 = 11.0 * 11.0 / 10.0;

    fn sample<F: Fn(f32, f32) -> f32>(f: F) -> [[f32; 3]; 3] {
        let mut s = [[0.0f32; 3]; 3];
        for (row, y) in s.iter_mut().zip([-1.0f32, 0.0, 1.0]) {
            for (cell, x) in row.iter_mut().zip([-1.0f32, 0.0, 1.0]) {
                *cell = f(x, y);
            }
        }
        s
    }

    #[test]
    fn recovers_paraboloid_peak() {
        let s = sample(|x, y| 1.0 - (x - 0.3).powi(2) - 2.0 * (y + 0.2).powi(2));
        let (ox, oy) = localize_subpixel(s, RATIO).unwrap();
        assert!((ox - 0.3).abs() < 1e-5);
        assert!((oy + 0.2).abs() < 1e-5);
    }

    #[test]
    fn recovers_peak_of_sheared_quadratic() {
        let (px, py) = (-0.25f32, 0.4f32);
        let s = sample(|x, y| {
            let (u, v) = (x - px, y - py);
            1.0 - u * u - 1.5 * v * v - 0.5 * u * v
        });
        let h = Hessian2D::from_neighborhood(s);
        assert!((h.dxy + 0.5).abs() < 1e-5);
        let (ox, oy) = localize_subpixel(s, RATIO).unwrap();
        assert!((ox - px).abs() < 1e-4);
        assert!((oy - py).abs() < 1e-4);
    }

    #[test]
    fn rejects_edge_like_response() {
        let s = sample(|x, y| 1.0 - 0.01 * x * x - 2.0 * y * y);
        assert_eq!(localize_subpixel(s, RATIO), Err(Rejection::EdgeResponse));
    }

    #[test]
    fn rejects_flat_response() {
        let s = [[0.5f32; 3]; 3];
        assert_eq!(localize_subpixel(s, RATIO), Err(Rejection::EdgeResponse));
    }

    #[test]
    fn rejects_offsets_outside_one_pixel() {
        let s = sample(|x, y| 1.0 - 0.1 * (x - 2.0).powi(2) - 0.1 * y * y);
        assert_eq!(localize_subpixel(s, RATIO), Err(Rejection::OutsideTrustRegion));

        let s = sample(|x, y| 1.0 - 0.1 * (x + 1.5).powi(2) - 0.1 * y * y);
        assert_eq!(localize_subpixel(s, RATIO), Err(Rejection::OutsideTrustRegion));
    }

    #[test]
    fn rejects_undefined_neighbors() {
        let mut s = sample(|x, y| 1.0 - x * x - y * y);
        s[0][2] = f32::NEG_INFINITY;
        assert_eq!(localize_subpixel(s, RATIO), Err(Rejection::UndefinedNeighborhood));
    }
}
