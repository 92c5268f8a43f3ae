//! Tracing macros that compile away without the `tracing` feature.
//!
//! Matchers open one span per run (`match_ssd`, `match_pmcc`,
//! `match_pmcc_multiscale`, `prepare_images`) and emit summary events with
//! per-run counts.

/// Opens an info-level span.
///
/// Without the `tracing` feature this yields a [`NoopSpan`].
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits an info-level event with named fields.
///
/// Without the `tracing` feature the field values are still evaluated so that
/// call sites do not trip unused-variable lints.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Span stand-in used when tracing is disabled.
///
/// Span fields are dropped unevaluated; `trace_event!` fields are still
/// evaluated, so keep them cheap.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `Span::entered`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
