//! Sub-pixel refinement of response maxima.

pub(crate) mod quad2d;
