//! Layout: group offsets, item cells and hit testing.
//!
//! - [`LayoutEngine`] keeps the per-group offsets and extents.
//! - [`LayoutStrategy`] measures a group as a grid or a list.
//! - [`RenderMetrics`] supplies content measurements.

mod engine;
mod geometry;
mod strategy;

pub use engine::LayoutEngine;
pub use geometry::{AxisRect, GroupGeometry, Orientation, Rect, NEEDS_LAYOUT};
pub use strategy::{
    FixedMetrics, GridStrategy, LayoutSource, LayoutStrategy, ListStrategy, MeasureContext, RenderMetrics,
};
