//! Coordinate transforms consumed by the matchers.
//!
//! The matchers only need to map points forward, map whole images through a
//! transform, and chain transforms. Concrete models cover the chains built
//! internally (scaling, translation) and the usual approximate registrations.

mod list;
mod models;

pub use list::TransformList;
pub use models::{Affine2D, Identity2D, Similarity2D, Translation2D};

/// A mapping of 2D points.
pub trait CoordinateTransform: Send + Sync {
    /// Maps `p` forward.
    fn apply(&self, p: [f32; 2]) -> [f32; 2];
}

/// A coordinate transform with an inverse.
pub trait InvertibleCoordinateTransform: CoordinateTransform {
    /// Maps `p` backward, or `None` if the transform is singular.
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]>;
}

impl<T: CoordinateTransform + ?Sized> CoordinateTransform for &T {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        (**self).apply(p)
    }
}

impl<T: InvertibleCoordinateTransform + ?Sized> InvertibleCoordinateTransform for &T {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        (**self).apply_inverse(p)
    }
}
