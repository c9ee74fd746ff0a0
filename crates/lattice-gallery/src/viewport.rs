//! Scroll translation and viewport size.
//!
//! The translation is the content coordinate shown at the viewport's leading
//! edge. It is kept inside `0..=max(0, content - viewport)`. Content
//! coordinates are `i64`; the viewport itself is `i32` pixels.
//!
//! Resize and scroll requests coming from the windowing side can arrive much
//! faster than the gallery needs to react. [`ViewportController::request_resize`]
//! and [`ViewportController::request_scroll`] only record the most recent
//! value; the owner applies them with [`ViewportController::take_pending`].

use lattice_gallery_core::logging::targets;

/// Requests recorded since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingViewport {
    /// `(primary, cross)` viewport size.
    pub resize: Option<(i32, i32)>,
    pub scroll: Option<i64>,
}

impl PendingViewport {
    /// No resize and no scroll recorded.
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && self.scroll.is_none()
    }
}

/// Translation, content extent and viewport extent along the primary axis.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    translation: i64,
    content_extent: i64,
    viewport_extent: i32,
    cross_extent: i32,
    pending: PendingViewport,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content coordinate at the viewport's leading edge.
    pub fn translation(&self) -> i64 {
        self.translation
    }

    pub fn content_extent(&self) -> i64 {
        self.content_extent
    }

    /// Viewport size along the primary axis.
    pub fn viewport_extent(&self) -> i32 {
        self.viewport_extent
    }

    /// Viewport size along the cross axis.
    pub fn cross_extent(&self) -> i32 {
        self.cross_extent
    }

    /// Largest valid translation.
    pub fn max_translation(&self) -> i64 {
        (self.content_extent - i64::from(self.viewport_extent)).max(0)
    }

    /// Content-space range currently shown, `start..end`.
    pub fn visible_range(&self) -> (i64, i64) {
        (self.translation, self.translation + i64::from(self.viewport_extent))
    }

    pub fn set_content_extent(&mut self, content_extent: i64) {
        self.content_extent = content_extent.max(0);
    }

    /// Set the viewport size immediately. Does not validate.
    pub fn set_viewport_size(&mut self, primary: i32, cross: i32) {
        self.viewport_extent = primary.max(0);
        self.cross_extent = cross.max(0);
    }

    /// Set the translation and clamp it. Returns `true` if it moved.
    pub fn set_translation(&mut self, translation: i64) -> bool {
        let previous = self.translation;
        self.translation = translation;
        self.validate();
        self.translation != previous
    }

    /// Shift the translation by `delta` and clamp it.
    pub fn translate_by(&mut self, delta: i64) -> bool {
        self.set_translation(self.translation.saturating_add(delta))
    }

    /// Clamp the translation into `[0, max(0, content - viewport)]`.
    pub fn validate(&mut self) {
        self.translation = self.translation.clamp(0, self.max_translation());
    }

    /// Scroll the minimum amount that brings `offset..offset + extent` into
    /// view. Items larger than the viewport are aligned to their start.
    pub fn ensure_visible(&mut self, offset: i64, extent: i64) -> bool {
        let previous = self.translation;
        let viewport = i64::from(self.viewport_extent);
        if offset < self.translation {
            self.translation = offset;
        } else if self.translation + viewport < offset + extent {
            self.translation = (offset + extent - viewport).min(offset);
        }
        self.validate();
        self.translation != previous
    }

    /// Update the content extent after a relayout.
    ///
    /// With `keep_relative_position` the content point at the viewport center
    /// stays at the center: its fraction `(translation + viewport / 2) / old`
    /// is reapplied to `new_extent`.
    pub fn adjust_for_resize(&mut self, old_extent: i64, new_extent: i64, keep_relative_position: bool) {
        let half = 0.5 * f64::from(self.viewport_extent);
        if keep_relative_position && old_extent > 0 {
            let position = (self.translation as f64 + half) / old_extent as f64;
            self.translation = (new_extent as f64 * position - half) as i64;
        }
        self.set_content_extent(new_extent);
        self.validate();
        tracing::trace!(
            target: targets::VIEWPORT,
            old_extent,
            new_extent,
            translation = self.translation,
            "viewport adjusted"
        );
    }

    // =========================================================================
    // Coalesced requests
    // =========================================================================

    /// Record a resize; replaces any earlier pending resize.
    pub fn request_resize(&mut self, primary: i32, cross: i32) {
        self.pending.resize = Some((primary, cross));
    }

    /// Record a scroll; replaces any earlier pending scroll.
    pub fn request_scroll(&mut self, translation: i64) {
        self.pending.scroll = Some(translation);
    }

    /// A resize or scroll is waiting for [`Self::take_pending`].
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the pending requests, leaving none behind.
    pub fn take_pending(&mut self) -> PendingViewport {
        std::mem::take(&mut self.pending)
    }
}
