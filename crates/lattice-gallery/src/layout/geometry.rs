//! Geometry types shared by the layout strategies and the viewport.
//!
//! Positions along the primary axis are content coordinates and use `i64`:
//! a virtual gallery with millions of groups easily exceeds `i32` pixels.
//! Physical [`Rect`]s are viewport coordinates and stay `i32`.

use serde::{Deserialize, Serialize};

/// Marker extent of a group that has not been measured yet.
pub const NEEDS_LAYOUT: i64 = -1;

/// Scrolling direction of the gallery.
///
/// Groups are stacked along the primary axis; items wrap along the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Scroll vertically, rows of items wrap horizontally (default).
    #[default]
    Vertical,
    /// Scroll horizontally, columns of items wrap vertically.
    Horizontal,
}

impl Orientation {
    /// Split a physical point into `(primary, cross)` coordinates.
    pub fn split(self, x: i32, y: i32) -> (i32, i32) {
        match self {
            Orientation::Vertical => (y, x),
            Orientation::Horizontal => (x, y),
        }
    }

    /// Map an item's physical `(width, height)` to `(primary, cross)` extents.
    pub fn item_extents(self, width: i32, height: i32) -> (i32, i32) {
        match self {
            Orientation::Vertical => (height, width),
            Orientation::Horizontal => (width, height),
        }
    }
}

/// A rectangle in physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// A rectangle expressed along the primary and cross axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisRect {
    pub primary: i64,
    pub cross: i32,
    pub primary_extent: i64,
    pub cross_extent: i32,
}

impl AxisRect {
    /// Exclusive end along the primary axis.
    pub fn primary_end(&self) -> i64 {
        self.primary + self.primary_extent
    }

    /// Shift along the primary axis, e.g. from content to viewport space.
    pub fn translated(mut self, delta: i64) -> Self {
        self.primary += delta;
        self
    }

    /// Physical rectangle. Primary values outside `i32` are clamped.
    pub fn to_rect(self, orientation: Orientation) -> Rect {
        let primary = clamp_to_i32(self.primary);
        let primary_extent = clamp_to_i32(self.primary_extent);
        match orientation {
            Orientation::Vertical => Rect::new(self.cross, primary, self.cross_extent, primary_extent),
            Orientation::Horizontal => Rect::new(primary, self.cross, primary_extent, self.cross_extent),
        }
    }
}

/// Clamp a content coordinate into the physical `i32` range.
pub(crate) fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Convert a count to a primary-axis multiplier, saturating on overflow.
pub(crate) fn count_to_i64(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Layout fields of one top-level group, in content coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupGeometry {
    /// Start along the primary axis.
    pub offset: i64,
    /// Length along the primary axis, header included. [`NEEDS_LAYOUT`]
    /// until measured.
    pub extent: i64,
    /// Length along the cross axis.
    pub cross_extent: i32,
    /// Primary length of the group header.
    pub header_extent: i32,
    /// Child count the group was measured with.
    pub len: usize,
    /// Whether children were laid out.
    pub expanded: bool,
    /// Row starts relative to the body, `len + 1` entries, for list rows of
    /// varying height. `None` when every row has the default extent.
    pub(crate) rows: Option<Box<[i64]>>,
}

impl GroupGeometry {
    /// Geometry of a group that still needs layout.
    pub fn unmeasured() -> Self {
        Self {
            offset: 0,
            extent: NEEDS_LAYOUT,
            cross_extent: 0,
            header_extent: 0,
            len: 0,
            expanded: false,
            rows: None,
        }
    }

    /// Whether the group was never measured.
    pub fn needs_layout(&self) -> bool {
        self.extent == NEEDS_LAYOUT
    }

    /// Extent counted towards the content size; unmeasured groups count zero.
    pub fn settled_extent(&self) -> i64 {
        self.extent.max(0)
    }

    /// Exclusive end along the primary axis.
    pub fn end(&self) -> i64 {
        self.offset + self.settled_extent()
    }

    /// Start of the children area along the primary axis.
    pub fn body_offset(&self) -> i64 {
        self.offset + i64::from(self.header_extent)
    }

    /// Bounds of the whole group, header included.
    pub fn bounds(&self) -> AxisRect {
        AxisRect {
            primary: self.offset,
            cross: 0,
            primary_extent: self.settled_extent(),
            cross_extent: self.cross_extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_rect_orientation() {
        let rect = AxisRect {
            primary: 10,
            cross: 2,
            primary_extent: 56,
            cross_extent: 72,
        };
        assert_eq!(rect.to_rect(Orientation::Vertical), Rect::new(2, 10, 72, 56));
        assert_eq!(rect.to_rect(Orientation::Horizontal), Rect::new(10, 2, 56, 72));
        assert_eq!(rect.translated(-10).primary, 0);
    }

    #[test]
    fn test_unmeasured_geometry() {
        let geometry = GroupGeometry::unmeasured();
        assert!(geometry.needs_layout());
        assert_eq!(geometry.settled_extent(), 0);
        assert_eq!(geometry.end(), 0);
    }

    #[test]
    fn test_split() {
        assert_eq!(Orientation::Vertical.split(3, 7), (7, 3));
        assert_eq!(Orientation::Horizontal.split(3, 7), (3, 7));
        assert_eq!(Orientation::Vertical.item_extents(72, 56), (56, 72));
    }

    #[test]
    fn test_far_content_clamps_to_physical() {
        let rect = AxisRect {
            primary: 3_000_000_000,
            cross: 2,
            primary_extent: 56,
            cross_extent: 72,
        };
        assert_eq!(rect.to_rect(Orientation::Vertical).y, i32::MAX);
        assert_eq!(rect.translated(-2_999_999_990).to_rect(Orientation::Vertical).y, 10);
        assert!(count_to_i64(usize::MAX) >= i64::from(u32::MAX));
    }
}
