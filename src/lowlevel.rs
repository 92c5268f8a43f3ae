//! Building blocks for custom matching pipelines.
//!
//! These expose block plans, scoring kernels, response maps, maximum
//! screening and sub-pixel localization underneath [`crate::Matcher`].

pub use crate::block::stats::{block_mean, block_variance};
pub use crate::block::{BlockGeometry, PmccBlockPlan, SsdBlockPlan};
pub use crate::candidate::nms::{best_two_maxima, LocalMaximum, MaximaSummary};
pub use crate::candidate::response::ResponseMap;
pub use crate::image::filter::{
    downsample, fill_with_noise, gaussian_blur, normalize_contrast, smooth_for_scale,
};
pub use crate::image::mapping::map_inverse_interpolated;
pub use crate::kernel::scalar::{PmccScalar, SsdMaskedScalar};
#[cfg(feature = "simd")]
pub use crate::kernel::simd::PmccSimd;
pub use crate::kernel::Kernel;
pub use crate::refine::quad2d::{localize_subpixel, Hessian2D};
