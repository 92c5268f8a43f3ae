//! Closed-form 2D transform models.

use crate::transform::{CoordinateTransform, InvertibleCoordinateTransform};

/// The identity mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Identity2D;

impl CoordinateTransform for Identity2D {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        p
    }
}

impl InvertibleCoordinateTransform for Identity2D {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        Some(p)
    }
}

/// Pure translation `p + (tx, ty)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Translation2D {
    pub tx: f32,
    pub ty: f32,
}

impl Translation2D {
    pub fn new(tx: f32, ty: f32) -> Self {
        Self { tx, ty }
    }
}

impl CoordinateTransform for Translation2D {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        [p[0] + self.tx, p[1] + self.ty]
    }
}

impl InvertibleCoordinateTransform for Translation2D {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        Some([p[0] - self.tx, p[1] - self.ty])
    }
}

/// Rotation and isotropic scaling followed by translation.
///
/// Stored as `(s·cos θ, s·sin θ, tx, ty)`:
///
/// ```text
/// x' = scos·x - ssin·y + tx
/// y' = ssin·x + scos·y + ty
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Similarity2D {
    scos: f32,
    ssin: f32,
    tx: f32,
    ty: f32,
}

impl Similarity2D {
    /// Creates a similarity from a scale factor, a rotation in radians and a
    /// translation.
    pub fn new(scale: f32, angle_rad: f32, tx: f32, ty: f32) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self {
            scos: scale * cos,
            ssin: scale * sin,
            tx,
            ty,
        }
    }

    /// Isotropic scaling about the origin.
    pub fn scaling(scale: f32) -> Self {
        Self::new(scale, 0.0, 0.0, 0.0)
    }

    /// Returns the scale factor.
    pub fn scale(&self) -> f32 {
        (self.scos * self.scos + self.ssin * self.ssin).sqrt()
    }
}

impl Default for Similarity2D {
    fn default() -> Self {
        Self::scaling(1.0)
    }
}

impl CoordinateTransform for Similarity2D {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        [
            self.scos * p[0] - self.ssin * p[1] + self.tx,
            self.ssin * p[0] + self.scos * p[1] + self.ty,
        ]
    }
}

impl InvertibleCoordinateTransform for Similarity2D {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        let det = self.scos * self.scos + self.ssin * self.ssin;
        if det == 0.0 {
            return None;
        }
        let x = p[0] - self.tx;
        let y = p[1] - self.ty;
        Some([
            (self.scos * x + self.ssin * y) / det,
            (-self.ssin * x + self.scos * y) / det,
        ])
    }
}

/// General affine map `A·p + t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2D {
    pub m00: f32,
    pub m01: f32,
    pub m02: f32,
    pub m10: f32,
    pub m11: f32,
    pub m12: f32,
}

impl Affine2D {
    /// Creates an affine map from the rows `[m00 m01 m02]` and `[m10 m11 m12]`.
    pub fn new(m00: f32, m01: f32, m02: f32, m10: f32, m11: f32, m12: f32) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
        }
    }

    fn det(&self) -> f32 {
        self.m00 * self.m11 - self.m01 * self.m10
    }
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }
}

impl CoordinateTransform for Affine2D {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        [
            self.m00 * p[0] + self.m01 * p[1] + self.m02,
            self.m10 * p[0] + self.m11 * p[1] + self.m12,
        ]
    }
}

impl InvertibleCoordinateTransform for Affine2D {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        let det = self.det();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let x = p[0] - self.m02;
        let y = p[1] - self.m12;
        Some([
            (self.m11 * x - self.m01 * y) / det,
            (-self.m10 * x + self.m00 * y) / det,
        ])
    }
}
