//! Blockmatch finds point correspondences between two grayscale images.
//!
//! Around each candidate point of a source image, a small block is compared
//! against displaced blocks of a target image that has been pre-aligned by an
//! approximate coordinate transform. Two metrics are provided:
//!
//! * [`Matcher::match_by_minimal_square_difference`] picks the integer
//!   offset with the smallest mean squared difference.
//! * [`Matcher::match_by_maximal_pmcc`] picks the offset with the largest
//!   Pearson correlation, optionally at a reduced scale, rejects ambiguous
//!   or edge-like maxima and refines the survivor to sub-pixel precision.
//!
//! Candidate points are independent; the `rayon` feature processes them in
//! parallel with results kept in input order. The `simd` feature vectorizes
//! the correlation kernel.
//!
//! ```
//! use blockmatch::{Identity2D, MatchConfig, Matcher, OwnedImage, Point};
//!
//! let src = OwnedImage::from_fn(48, 48, |x, y| {
//!     (x as f32 * 0.37).sin() * (y as f32 * 0.29).cos()
//! })?;
//! let cfg = MatchConfig {
//!     block_radius_x: 5,
//!     block_radius_y: 5,
//!     search_radius_x: 3,
//!     search_radius_y: 3,
//!     ..MatchConfig::default()
//! };
//! let matcher = Matcher::new(cfg);
//! let points = [Point::new([24.0, 24.0])];
//! let found = matcher.match_by_minimal_square_difference(
//!     src.view(),
//!     src.view(),
//!     &Identity2D,
//!     &points,
//! )?;
//! assert_eq!(found.len(), 1);
//! # Ok::<(), blockmatch::BlockMatchError>(())
//! ```

pub mod block;
pub mod candidate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod point;
mod refine;
pub mod search;
mod trace;
pub mod transform;
pub mod util;

pub use candidate::grid::{mesh_lattice_points, regular_grid_points};
pub use image::{ImageView, OwnedImage};
pub use kernel::Kernel;
pub use point::{Correspondences, Point, PointMatch};
pub use search::{
    MatchConfig, Matcher, Metric, Rejection, RejectionCounts, RejectionParams,
};
pub use transform::{
    Affine2D, CoordinateTransform, Identity2D, InvertibleCoordinateTransform, Similarity2D,
    TransformList, Translation2D,
};
pub use util::{BlockMatchError, BlockMatchResult};
