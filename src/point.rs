//! Points, point matches and the correspondence set produced by a run.

use crate::search::RejectionCounts;

/// A 2D point with a fixed local position and a transformed world position.
///
/// `world == local` until a transform is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    local: [f32; 2],
    world: [f32; 2],
}

impl Point {
    /// Creates a point whose world position equals its local position.
    pub fn new(local: [f32; 2]) -> Self {
        Self {
            local,
            world: local,
        }
    }

    /// Creates a point with an explicitly set world position.
    pub fn with_world(local: [f32; 2], world: [f32; 2]) -> Self {
        Self { local, world }
    }

    /// Returns the local position.
    pub fn local(&self) -> [f32; 2] {
        self.local
    }

    /// Returns the world position.
    pub fn world(&self) -> [f32; 2] {
        self.world
    }

    /// Recomputes the world position as `transform(local)`.
    pub fn apply<T>(&mut self, transform: &T)
    where
        T: crate::transform::CoordinateTransform + ?Sized,
    {
        self.world = transform.apply(self.local);
    }
}

/// A source point paired with the target point it corresponds to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMatch {
    pub source: Point,
    pub target: Point,
}

impl PointMatch {
    pub fn new(source: Point, target: Point) -> Self {
        Self { source, target }
    }

    /// World-space displacement from source to target.
    pub fn displacement(&self) -> [f32; 2] {
        let s = self.source.world();
        let t = self.target.world();
        [t[0] - s[0], t[1] - s[1]]
    }
}

/// Accepted matches of one run, in candidate-point order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondences {
    matches: Vec<PointMatch>,
    /// Candidate points that produced no match, per reason.
    pub rejections: RejectionCounts,
    /// Set when the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl Correspondences {
    pub(crate) fn new(
        matches: Vec<PointMatch>,
        rejections: RejectionCounts,
        cancelled: bool,
    ) -> Self {
        Self {
            matches,
            rejections,
            cancelled,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointMatch> {
        self.matches.iter()
    }

    pub fn as_slice(&self) -> &[PointMatch] {
        &self.matches
    }

    pub fn into_vec(self) -> Vec<PointMatch> {
        self.matches
    }

    /// World-space displacement of every match.
    pub fn displacements(&self) -> Vec<[f32; 2]> {
        self.matches.iter().map(PointMatch::displacement).collect()
    }
}

impl<'a> IntoIterator for &'a Correspondences {
    type Item = &'a PointMatch;
    type IntoIter = std::slice::Iter<'a, PointMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl IntoIterator for Correspondences {
    type Item = PointMatch;
    type IntoIter = std::vec::IntoIter<PointMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}
