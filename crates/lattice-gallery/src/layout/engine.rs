//! Group offsets along the primary axis.
//!
//! Offsets and extents are `i64`: a virtual gallery with millions of groups
//! easily passes the `i32` pixel range.

use std::ops::Range;

use lattice_gallery_core::logging::{span_names, targets};
use lattice_gallery_core::PerfSpan;

use crate::config::LayoutConfig;

use super::geometry::{AxisRect, GroupGeometry, Orientation};
use super::strategy::{FixedMetrics, LayoutSource, LayoutStrategy, MeasureContext, RenderMetrics};

/// Keeps one [`GroupGeometry`] per top-level group.
///
/// Offsets are accumulated in group order, so `geometry[i].offset` equals the
/// sum of the extents of groups `0..i`. A full recompute measures every group;
/// an incremental recompute measures one group and shifts the offsets of the
/// groups after it by the extent delta.
pub struct LayoutEngine {
    orientation: Orientation,
    strategy: LayoutStrategy,
    metrics: Box<dyn RenderMetrics>,
    group_headers: bool,
    always_expanded: bool,
    cross_extent: i32,
    columns: usize,
    margin: i32,
    geometry: Vec<GroupGeometry>,
    content_extent: i64,
}

impl LayoutEngine {
    /// Engine with no groups and a zero cross extent.
    pub fn new(config: &LayoutConfig, orientation: Orientation) -> Self {
        let strategy = LayoutStrategy::from_config(config);
        Self {
            orientation,
            strategy,
            metrics: Box::new(FixedMetrics {
                font_height: config.header_font_height,
            }),
            group_headers: config.group_headers,
            always_expanded: config.always_expanded,
            cross_extent: 0,
            columns: 1,
            margin: strategy.min_margin(),
            geometry: Vec::new(),
            content_extent: 0,
        }
    }

    /// Replace the content measurements. Takes effect on the next recompute.
    pub fn set_metrics(&mut self, metrics: Box<dyn RenderMetrics>) {
        self.metrics = metrics;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Strategy laying out the children of every group.
    pub fn strategy(&self) -> &LayoutStrategy {
        &self.strategy
    }

    /// Items per line at the current cross extent.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cell spacing along the cross axis at the current cross extent.
    pub fn margin(&self) -> i32 {
        self.margin
    }

    /// Viewport size along the cross axis.
    pub fn cross_extent(&self) -> i32 {
        self.cross_extent
    }

    /// Total primary extent of all groups.
    pub fn content_extent(&self) -> i64 {
        self.content_extent
    }

    /// Number of groups with geometry.
    pub fn group_count(&self) -> usize {
        self.geometry.len()
    }

    /// Last measured geometry of `group`.
    pub fn geometry(&self, group: usize) -> Option<&GroupGeometry> {
        self.geometry.get(group)
    }

    /// Set the viewport's cross extent. Returns `true` when the line layout
    /// changed and a full recompute is needed.
    pub fn set_cross_extent(&mut self, cross_extent: i32) -> bool {
        if self.cross_extent == cross_extent {
            return false;
        }
        self.cross_extent = cross_extent;
        let (columns, margin) = self.strategy.columns(self.orientation, cross_extent);
        self.columns = columns;
        self.margin = margin;
        true
    }

    fn context(&self) -> MeasureContext<'_> {
        MeasureContext {
            orientation: self.orientation,
            cross_extent: self.cross_extent,
            columns: self.columns,
            margin: self.margin,
            group_headers: self.group_headers,
            always_expanded: self.always_expanded,
            metrics: self.metrics.as_ref(),
        }
    }

    // =========================================================================
    // Recompute
    // =========================================================================

    /// Measure every group and return the total content extent.
    pub fn full_recompute(&mut self, source: &dyn LayoutSource) -> i64 {
        let _span = PerfSpan::new(span_names::FULL_LAYOUT);
        let count = source.group_count();
        let mut geometry = Vec::with_capacity(count);
        let mut offset: i64 = 0;
        {
            let ctx = self.context();
            for group in 0..count {
                let mut measured = self.strategy.measure_group(source, group, &ctx);
                measured.offset = offset;
                offset = offset.saturating_add(measured.extent);
                geometry.push(measured);
            }
        }
        self.geometry = geometry;
        self.content_extent = offset;
        tracing::debug!(
            target: targets::LAYOUT,
            groups = count,
            content_extent = offset,
            columns = self.columns,
            "full layout"
        );
        offset
    }

    /// Re-measure one group and shift the groups after it.
    ///
    /// Returns the extent delta. A group that was never measured counts as
    /// zero before.
    pub fn relayout_group(&mut self, source: &dyn LayoutSource, group: usize) -> i64 {
        let Some(previous) = self.geometry.get(group) else {
            return 0;
        };
        let offset = previous.offset;
        let old_extent = previous.settled_extent();

        let mut measured = self.strategy.measure_group(source, group, &self.context());
        measured.offset = offset;
        let delta = measured.extent - old_extent;
        self.geometry[group] = measured;
        self.shift_after(group, delta);
        tracing::trace!(target: targets::LAYOUT, group, delta, "group layout");
        delta
    }

    /// Insert geometry for a new group at `group` and measure it.
    pub fn insert_group(&mut self, source: &dyn LayoutSource, group: usize) -> i64 {
        let group = group.min(self.geometry.len());
        let mut placeholder = GroupGeometry::unmeasured();
        placeholder.offset = self.geometry.get(group).map_or(self.content_extent, |next| next.offset);
        self.geometry.insert(group, placeholder);
        self.relayout_group(source, group)
    }

    /// Drop the geometry of `group`. Returns the (negative) extent delta.
    pub fn remove_group(&mut self, group: usize) -> i64 {
        if group >= self.geometry.len() {
            return 0;
        }
        let removed = self.geometry.remove(group);
        let delta = -removed.settled_extent();
        self.content_extent += delta;
        for later in &mut self.geometry[group..] {
            later.offset += delta;
        }
        delta
    }

    fn shift_after(&mut self, group: usize, delta: i64) {
        if delta == 0 {
            return;
        }
        for later in &mut self.geometry[group + 1..] {
            later.offset += delta;
        }
        self.content_extent += delta;
    }

    // =========================================================================
    // Queries (content coordinates)
    // =========================================================================

    /// Groups intersecting `start..=end`.
    ///
    /// The first candidate is found by binary search; the walk stops at the
    /// first group starting after `end`.
    pub fn visible_groups(&self, start: i64, end: i64) -> Range<usize> {
        let first = self.geometry.partition_point(|group| group.end() < start);
        let mut last = first;
        while last < self.geometry.len() && self.geometry[last].offset <= end {
            last += 1;
        }
        first..last
    }

    /// Group whose extent contains `primary`.
    pub fn group_at(&self, primary: i64) -> Option<usize> {
        if primary < 0 {
            return None;
        }
        let index = self.geometry.partition_point(|group| group.end() <= primary);
        let group = self.geometry.get(index)?;
        (primary >= group.offset && primary < group.end()).then_some(index)
    }

    /// Bounds of `group`, header included, in content coordinates.
    pub fn group_bounds(&self, group: usize) -> Option<AxisRect> {
        self.geometry.get(group).map(GroupGeometry::bounds)
    }

    /// Bounds of child `index` of `group` in content coordinates.
    pub fn item_rect(&self, group: usize, index: usize) -> Option<AxisRect> {
        let geometry = self.geometry.get(group)?;
        self.strategy.item_rect(geometry, &self.context(), index)
    }

    /// Child of `group` under the point.
    pub fn hit_item(&self, group: usize, primary: i64, cross: i32) -> Option<usize> {
        let geometry = self.geometry.get(group)?;
        self.strategy.hit_item(geometry, &self.context(), primary, cross)
    }

    /// Children of `group` intersecting `start..end`.
    pub fn visible_children(&self, group: usize, start: i64, end: i64) -> Range<usize> {
        match self.geometry.get(group) {
            Some(geometry) => self.strategy.visible_children(geometry, &self.context(), start, end),
            None => 0..0,
        }
    }

    /// Full lines that fit in `viewport_extent`, at least one.
    pub fn lines_per_page(&self, viewport_extent: i32) -> usize {
        let step = self.strategy.line_step(self.orientation);
        usize::try_from(i64::from(viewport_extent) / step).unwrap_or(0).max(1)
    }
}
