//! Logging facilities for the gallery engine.
//!
//! The gallery crates are instrumented with the `tracing` crate. Nothing is
//! printed unless the embedding application installs a subscriber:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("lattice_gallery::layout=debug"))
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] so that subsystems can
//! be filtered independently.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_gallery_core::signal";
    /// Slot storage, insertion and removal.
    pub const COLLECTION: &str = "lattice_gallery::collection";
    /// Group extent computation.
    pub const LAYOUT: &str = "lattice_gallery::layout";
    /// Selection changes.
    pub const SELECTION: &str = "lattice_gallery::selection";
    /// Scroll translation and resize handling.
    pub const VIEWPORT: &str = "lattice_gallery::viewport";
    /// Lazy group realization.
    pub const REALIZE: &str = "lattice_gallery::realize";
    /// Performance spans.
    pub const PERF: &str = "lattice_gallery::perf";
}

/// Span names for the long-running passes.
pub mod span_names {
    /// Full layout recompute over every group.
    pub const FULL_LAYOUT: &str = "full_layout";
    /// Installing fetched content into a group.
    pub const REALIZE_GROUP: &str = "realize_group";
    /// Paint-pass preparation (visible range and realization requests).
    pub const PREPARE_PAINT: &str = "prepare_paint";
}

/// A guard that keeps a performance span entered until dropped.
///
/// ```
/// use lattice_gallery_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("full_layout");
///     // timed work
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
