//! Ordered composition of transforms.

use crate::transform::{CoordinateTransform, InvertibleCoordinateTransform};

/// A chain of borrowed transforms applied in insertion order.
///
/// `apply` runs the first pushed transform first; `apply_inverse` undoes them
/// in reverse order.
#[derive(Default)]
pub struct TransformList<'a> {
    items: Vec<&'a dyn InvertibleCoordinateTransform>,
}

impl<'a> TransformList<'a> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a transform to the end of the chain.
    pub fn push(&mut self, t: &'a dyn InvertibleCoordinateTransform) {
        self.items.push(t);
    }

    /// Builder form of [`TransformList::push`].
    pub fn then(mut self, t: &'a dyn InvertibleCoordinateTransform) -> Self {
        self.push(t);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CoordinateTransform for TransformList<'_> {
    fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        self.items.iter().fold(p, |acc, t| t.apply(acc))
    }
}

impl InvertibleCoordinateTransform for TransformList<'_> {
    fn apply_inverse(&self, p: [f32; 2]) -> Option<[f32; 2]> {
        self.items
            .iter()
            .rev()
            .try_fold(p, |acc, t| t.apply_inverse(acc))
    }
}
