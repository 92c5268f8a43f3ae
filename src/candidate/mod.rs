//! Response maps, maxima selection and candidate point layouts.

pub mod grid;
pub(crate) mod nms;
pub mod response;
