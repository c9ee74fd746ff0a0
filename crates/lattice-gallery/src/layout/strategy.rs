//! Grid and list layout strategies.
//!
//! A strategy measures one group at a time (header plus children) and answers
//! positional questions about a measured group: where child `i` is, which
//! child is under a point and which children intersect a clip range. All
//! values are integer pixels; primary-axis positions are `i64`.
//!
//! Divisors derived from the configuration are clamped to at least one
//! pixel, so a configuration that fails [`GalleryConfig::validate`] lays out
//! degenerately instead of panicking.
//!
//! [`GalleryConfig::validate`]: crate::GalleryConfig::validate

use std::ops::Range;

use crate::config::{LayoutConfig, StrategyKind};
use crate::item::{FontSpec, ImageSize, ItemContent};

use super::geometry::{count_to_i64, AxisRect, GroupGeometry, Orientation};

/// Header images are scaled to fit this box.
const HEADER_IMAGE_BOX: i32 = 32;

/// Pixel measurements of content.
pub trait RenderMetrics {
    /// Line height for `font`, or for the default font when `None`.
    fn font_height(&self, font: Option<&FontSpec>) -> i32;

    /// Natural size of the item's image.
    fn image_size(&self, content: &ItemContent) -> Option<ImageSize> {
        content.image
    }
}

/// Metrics that trust the font's declared height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMetrics {
    pub font_height: i32,
}

impl RenderMetrics for FixedMetrics {
    fn font_height(&self, font: Option<&FontSpec>) -> i32 {
        font.map_or(self.font_height, |font| font.height)
    }
}

/// Read access to the groups being laid out.
pub trait LayoutSource {
    fn group_count(&self) -> usize;
    /// Reported child count of `group`; a dummy reports its placeholder.
    fn group_len(&self, group: usize) -> usize;
    fn group_expanded(&self, group: usize) -> bool;
    /// Header content, `None` while the group is unrealized.
    fn group_header(&self, group: usize) -> Option<&ItemContent>;
    /// Content of a realized child.
    fn child_content(&self, group: usize, index: usize) -> Option<&ItemContent>;
}

/// Per-gallery values the strategies measure against.
#[derive(Clone, Copy)]
pub struct MeasureContext<'a> {
    pub orientation: Orientation,
    /// Viewport size along the cross axis.
    pub cross_extent: i32,
    /// Items per line (grid) or 1 (list).
    pub columns: usize,
    /// Spacing between cells along the cross axis.
    pub margin: i32,
    pub group_headers: bool,
    pub always_expanded: bool,
    pub metrics: &'a dyn RenderMetrics,
}

/// Fixed-size cells wrapped into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStrategy {
    pub item_width: i32,
    pub item_height: i32,
    pub min_margin: i32,
    pub auto_margin: bool,
}

/// One item per row; row extent grows with the item's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStrategy {
    pub row_extent: i32,
    pub spacing: i32,
    pub min_margin: i32,
    /// Box the item image is fitted into when measuring a row.
    pub image_width: i32,
    pub image_height: i32,
}

/// How the children of a group are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    Grid(GridStrategy),
    List(ListStrategy),
}

impl LayoutStrategy {
    /// Build the strategy selected by `config`.
    pub fn from_config(config: &LayoutConfig) -> Self {
        match config.strategy {
            StrategyKind::Grid => LayoutStrategy::Grid(GridStrategy {
                item_width: config.item_width,
                item_height: config.item_height,
                min_margin: config.min_margin,
                auto_margin: config.auto_margin,
            }),
            StrategyKind::List => LayoutStrategy::List(ListStrategy {
                row_extent: config.list_row_extent,
                spacing: config.list_spacing,
                min_margin: config.min_margin,
                image_width: config.item_width,
                image_height: config.item_height,
            }),
        }
    }

    /// Spacing around the content and between cells.
    pub fn min_margin(&self) -> i32 {
        match self {
            LayoutStrategy::Grid(grid) => grid.min_margin,
            LayoutStrategy::List(list) => list.min_margin,
        }
    }

    /// Items per line and cell margin for a viewport `cross_extent` wide.
    pub fn columns(&self, orientation: Orientation, cross_extent: i32) -> (usize, i32) {
        match self {
            LayoutStrategy::Grid(grid) => {
                let (_, item_cross) = grid.item_extents(orientation);
                let columns = grid.columns(cross_extent, item_cross);
                let margin = if grid.auto_margin {
                    grid.auto_margin(cross_extent, columns, item_cross)
                } else {
                    grid.min_margin
                };
                (columns, margin)
            }
            LayoutStrategy::List(list) => (1, list.min_margin),
        }
    }

    /// Step between consecutive lines along the primary axis, at least one.
    pub fn line_step(&self, orientation: Orientation) -> i64 {
        let step = match self {
            LayoutStrategy::Grid(grid) => grid.item_extents(orientation).0 + grid.min_margin,
            LayoutStrategy::List(list) => list.row_extent + list.spacing,
        };
        i64::from(step.max(1))
    }

    /// Measure `group` from scratch. The returned offset is zero.
    pub fn measure_group(
        &self,
        source: &dyn LayoutSource,
        group: usize,
        ctx: &MeasureContext<'_>,
    ) -> GroupGeometry {
        let len = source.group_len(group);
        let expanded = ctx.always_expanded || source.group_expanded(group);
        let header_extent = if ctx.group_headers {
            header_extent(source.group_header(group), self.min_margin(), ctx.metrics)
        } else {
            0
        };

        let mut geometry = GroupGeometry {
            offset: 0,
            extent: i64::from(header_extent),
            cross_extent: ctx.cross_extent,
            header_extent,
            len,
            expanded,
            rows: None,
        };
        if len == 0 {
            return geometry;
        }

        match self {
            LayoutStrategy::Grid(grid) => {
                let (_, item_cross) = grid.item_extents(ctx.orientation);
                let columns = ctx.columns.max(1) as i32;
                geometry.cross_extent = columns * item_cross + (columns - 1) * ctx.margin + 2 * grid.min_margin;
                if expanded {
                    let lines = count_to_i64(len.div_ceil(ctx.columns.max(1)));
                    let body = lines.saturating_mul(self.line_step(ctx.orientation));
                    geometry.extent = geometry.extent.saturating_add(body);
                }
            }
            LayoutStrategy::List(list) => {
                if expanded {
                    let rows = list.measure_rows(source, group, len, ctx);
                    let body = match &rows {
                        Some(rows) => rows[len],
                        None => count_to_i64(len).saturating_mul(list.step()),
                    };
                    geometry.extent = geometry.extent.saturating_add(body);
                    geometry.rows = rows;
                }
            }
        }
        geometry
    }

    /// Bounds of child `index` in content coordinates.
    pub fn item_rect(&self, geometry: &GroupGeometry, ctx: &MeasureContext<'_>, index: usize) -> Option<AxisRect> {
        if index >= geometry.len || !geometry.expanded {
            return None;
        }
        let body = geometry.body_offset();
        match self {
            LayoutStrategy::Grid(grid) => {
                let (item_primary, item_cross) = grid.item_extents(ctx.orientation);
                let columns = ctx.columns.max(1);
                let column = (index % columns) as i32;
                let line = count_to_i64(index / columns);
                Some(AxisRect {
                    primary: body.saturating_add(line.saturating_mul(self.line_step(ctx.orientation))),
                    cross: column * (item_cross + ctx.margin) + ctx.margin,
                    primary_extent: i64::from(item_primary),
                    cross_extent: item_cross,
                })
            }
            LayoutStrategy::List(list) => {
                let (start, extent) = list.row(geometry, index);
                Some(AxisRect {
                    primary: body + start,
                    cross: list.min_margin,
                    primary_extent: extent,
                    cross_extent: (ctx.cross_extent - 2 * list.min_margin).max(0),
                })
            }
        }
    }

    /// Child under the content-space point, if any.
    pub fn hit_item(
        &self,
        geometry: &GroupGeometry,
        ctx: &MeasureContext<'_>,
        primary: i64,
        cross: i32,
    ) -> Option<usize> {
        if !geometry.expanded || geometry.len == 0 {
            return None;
        }
        let relative = primary - geometry.body_offset();
        if relative < 0 {
            return None;
        }
        match self {
            LayoutStrategy::Grid(grid) => {
                let (item_primary, item_cross) = grid.item_extents(ctx.orientation);
                let columns = ctx.columns.max(1);

                let cross_relative = cross - ctx.margin;
                let cross_step = (item_cross + ctx.margin).max(1);
                if cross_relative < 0 || cross_relative % cross_step > item_cross {
                    return None;
                }
                let column = (cross_relative / cross_step) as usize;
                if column >= columns {
                    return None;
                }

                let primary_step = self.line_step(ctx.orientation);
                if relative % primary_step > i64::from(item_primary) {
                    return None;
                }
                let line = usize::try_from(relative / primary_step).ok()?;
                let index = line.checked_mul(columns)?.checked_add(column)?;
                (index < geometry.len).then_some(index)
            }
            LayoutStrategy::List(list) => {
                if cross < list.min_margin || cross >= ctx.cross_extent - list.min_margin {
                    return None;
                }
                let index = list.row_at(geometry, relative)?;
                let (start, extent) = list.row(geometry, index);
                (relative < start + extent).then_some(index)
            }
        }
    }

    /// Children intersecting the content-space range `start..end`.
    pub fn visible_children(
        &self,
        geometry: &GroupGeometry,
        ctx: &MeasureContext<'_>,
        start: i64,
        end: i64,
    ) -> Range<usize> {
        if !geometry.expanded || geometry.len == 0 {
            return 0..0;
        }
        match self {
            LayoutStrategy::Grid(_) => {
                let columns = ctx.columns.max(1);
                let step = self.line_step(ctx.orientation);
                let base = geometry.body_offset();
                let line = |position: i64| usize::try_from(((position - base) / step).max(0)).unwrap_or(usize::MAX);
                let first = line(start).saturating_mul(columns).min(geometry.len);
                let last = line(end).saturating_add(1).saturating_mul(columns).min(geometry.len);
                first..last
            }
            LayoutStrategy::List(list) => {
                let body = geometry.body_offset();
                let first = list.row_at(geometry, (start - body).max(0)).unwrap_or(geometry.len);
                let last = list
                    .row_at(geometry, (end - body).max(0))
                    .map_or(geometry.len, |row| row + 1);
                first.min(last)..last
            }
        }
    }
}

impl GridStrategy {
    /// `(primary, cross)` cell extents.
    pub fn item_extents(&self, orientation: Orientation) -> (i32, i32) {
        orientation.item_extents(self.item_width, self.item_height)
    }

    /// Cells per line; at least one even when a single cell does not fit.
    pub fn columns(&self, cross_extent: i32, item_cross: i32) -> usize {
        let fit = (cross_extent - self.min_margin) / (item_cross + self.min_margin).max(1);
        fit.max(1) as usize
    }

    /// Spread the spare space of a line evenly across `columns + 1` gaps.
    pub fn auto_margin(&self, cross_extent: i32, columns: usize, item_cross: i32) -> i32 {
        let columns = columns as i32;
        let spare = cross_extent - self.min_margin - columns * (item_cross + self.min_margin);
        let extra = (spare as f64 / (columns + 1) as f64).round() as i32;
        (self.min_margin + extra).max(self.min_margin)
    }
}

impl ListStrategy {
    /// Default row plus spacing, at least one.
    fn step(&self) -> i64 {
        i64::from((self.row_extent + self.spacing).max(1))
    }

    fn row_content_extent(&self, content: &ItemContent, metrics: &dyn RenderMetrics) -> i32 {
        let font_height = metrics.font_height(content.style.font.as_ref());
        let text = content.text_lines() * (font_height + 2) + 2;
        let image = metrics
            .image_size(content)
            .map_or(0, |size| size.best_fit(self.image_width, self.image_height).height);
        self.row_extent.max(text).max(image)
    }

    /// Row starts for groups whose rows differ from the default extent.
    fn measure_rows(
        &self,
        source: &dyn LayoutSource,
        group: usize,
        len: usize,
        ctx: &MeasureContext<'_>,
    ) -> Option<Box<[i64]>> {
        let mut rows = Vec::with_capacity(len + 1);
        let mut uniform = true;
        let mut position: i64 = 0;
        for index in 0..len {
            rows.push(position);
            let extent = source
                .child_content(group, index)
                .map_or(self.row_extent, |content| self.row_content_extent(content, ctx.metrics));
            uniform &= extent == self.row_extent;
            position = position.saturating_add(i64::from(extent + self.spacing));
        }
        rows.push(position);
        (!uniform).then(|| rows.into_boxed_slice())
    }

    /// Start (relative to the body) and extent of row `index`.
    fn row(&self, geometry: &GroupGeometry, index: usize) -> (i64, i64) {
        match &geometry.rows {
            Some(rows) => (rows[index], rows[index + 1] - rows[index] - i64::from(self.spacing)),
            None => (
                count_to_i64(index).saturating_mul(self.step()),
                i64::from(self.row_extent),
            ),
        }
    }

    /// Row whose slot (row plus trailing spacing) contains `relative`.
    fn row_at(&self, geometry: &GroupGeometry, relative: i64) -> Option<usize> {
        let index = match &geometry.rows {
            Some(rows) => rows[..geometry.len].partition_point(|start| *start <= relative).checked_sub(1)?,
            None => usize::try_from(relative / self.step()).ok()?,
        };
        (index < geometry.len).then_some(index)
    }
}

/// Primary extent of a group header, trailing margin included.
fn header_extent(header: Option<&ItemContent>, min_margin: i32, metrics: &dyn RenderMetrics) -> i32 {
    let font_height = metrics.font_height(header.and_then(|content| content.style.font.as_ref()));
    let title = font_height + 5;
    let lines = header.map_or(1, ItemContent::text_lines);
    let text = lines * (font_height + 2) + 2;
    let image = header
        .and_then(|content| metrics.image_size(content))
        .map_or(0, |size| size.best_fit(HEADER_IMAGE_BOX, HEADER_IMAGE_BOX).height + 2 * min_margin);
    title.max(text).max(image) + min_margin
}
