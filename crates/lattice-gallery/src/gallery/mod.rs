//! The gallery facade.
//!
//! [`Gallery`] composes the item arena, the top-level slot collection, the
//! layout engine, the viewport and the selection model behind one API. Every
//! structural mutation keeps the four in step: selection is evicted before
//! items are disposed, layout is recomputed (fully or for the touched group)
//! and the translation is revalidated.
//!
//! # Virtual galleries
//!
//! ```ignore
//! use lattice_gallery::{Gallery, GalleryConfig};
//!
//! let mut gallery = Gallery::with_provider(GalleryConfig::virtual_groups(), photos);
//! gallery.set_viewport_size(800, 600);
//! gallery.set_count(1_000_000);
//!
//! // paint pass: dummies intersecting the clip are queued for realization
//! let visible = gallery.prepare_paint(clip);
//! // later, outside the paint pass
//! gallery.realize_pending();
//! ```

mod navigation;
mod tree;

use std::ops::Range;

use lattice_gallery_core::logging::{span_names, targets};
use lattice_gallery_core::{PerfSpan, Signal};

use crate::collection::Slot;
use crate::config::GalleryConfig;
use crate::error::{GalleryError, ProviderError, Result};
use crate::group::VirtualGroup;
use crate::item::{ItemContent, ItemId, MaterializationState, ResolvedStyle};
use crate::layout::{LayoutEngine, Orientation, Rect, RenderMetrics};
use crate::provider::{ContentProvider, GroupChildren, GroupData};
use crate::realize::{RealizationOutcome, RealizationQueue, RealizationTicket};
use crate::selection::{ItemPath, SelectionMode, SelectionModel};
use crate::viewport::ViewportController;

pub use navigation::NavigationKey;

use tree::{ItemTree, Node};

/// Notifications emitted by the gallery besides selection changes.
#[derive(Default)]
pub struct GallerySignals {
    /// A group was expanded or collapsed. Args: (group, expanded)
    pub expand_changed: Signal<(ItemId, bool)>,
    /// An item was activated (double click, Enter).
    pub default_action: Signal<ItemId>,
}

/// Modifier state of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    /// Toggle the clicked item (Ctrl/Cmd).
    pub toggle: bool,
    /// Extend from the anchor to the clicked item (Shift).
    pub range: bool,
}

impl ClickModifiers {
    pub const NONE: Self = Self {
        toggle: false,
        range: false,
    };
    pub const TOGGLE: Self = Self {
        toggle: true,
        range: false,
    };
    pub const RANGE: Self = Self {
        toggle: false,
        range: true,
    };
}

/// A group intersecting the paint clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleGroup {
    /// Top-level position.
    pub index: usize,
    /// `None` while the slot is unrealized.
    pub group: Option<ItemId>,
    /// Group bounds in viewport coordinates.
    pub bounds: Rect,
    /// Children intersecting the clip.
    pub children: Range<usize>,
    /// A realization request for this group is outstanding.
    pub realizing: bool,
}

/// A virtualized two-level collection.
pub struct Gallery {
    config: GalleryConfig,
    tree: ItemTree,
    layout: LayoutEngine,
    viewport: ViewportController,
    selection: SelectionModel,
    realization: RealizationQueue,
    provider: Option<Box<dyn ContentProvider>>,
    signals: GallerySignals,
}

impl Gallery {
    /// Empty gallery without a provider.
    ///
    /// A configuration that fails [`GalleryConfig::validate`] is used as is
    /// and logged; zero-sized cells lay out degenerately.
    pub fn new(config: GalleryConfig) -> Self {
        if let Err(error) = config.validate() {
            tracing::warn!(target: targets::LAYOUT, %error, "invalid gallery configuration");
        }
        Self {
            tree: ItemTree::new(config.virtual_group_default_item_count),
            layout: LayoutEngine::new(&config.layout, config.orientation),
            viewport: ViewportController::new(),
            selection: SelectionModel::new(config.selection_mode),
            realization: RealizationQueue::with_batch_size(config.realization_batch_size),
            provider: None,
            signals: GallerySignals::default(),
            config,
        }
    }

    /// Empty gallery fetching its content from `provider`.
    pub fn with_provider(config: GalleryConfig, provider: impl ContentProvider + 'static) -> Self {
        let mut gallery = Self::new(config);
        gallery.set_provider(provider);
        gallery
    }

    /// Replace the content provider. Content already fetched is kept.
    pub fn set_provider(&mut self, provider: impl ContentProvider + 'static) {
        self.provider = Some(Box::new(provider));
    }

    /// Replace the content measurements and relayout.
    pub fn set_metrics(&mut self, metrics: Box<dyn RenderMetrics>) {
        self.layout.set_metrics(metrics);
        self.relayout_all();
    }

    /// Configuration the gallery was built with.
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Structural and viewport change notifications.
    pub fn signals(&self) -> &GallerySignals {
        &self.signals
    }

    /// Selection state; connect to `selection().selection_changed` for
    /// notifications.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Group geometry in content coordinates.
    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Translation and viewport size.
    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// Direction groups are stacked in.
    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    /// Switch the selection mode, trimming the selection to fit it.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.config.selection_mode = mode;
        self.selection.set_mode(mode);
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Resize the viewport immediately.
    pub fn set_viewport_size(&mut self, width: i32, height: i32) {
        let (primary, cross) = self.config.orientation.split(width, height);
        self.apply_resize(primary, cross);
    }

    /// Record a resize, applied on [`flush`](Self::flush).
    pub fn request_resize(&mut self, width: i32, height: i32) {
        let (primary, cross) = self.config.orientation.split(width, height);
        self.viewport.request_resize(primary, cross);
    }

    /// Record a scroll, applied on [`flush`](Self::flush).
    pub fn request_scroll(&mut self, translation: i64) {
        self.viewport.request_scroll(translation);
    }

    /// Apply the most recent pending resize and scroll. Returns `true` if
    /// anything was pending.
    pub fn flush(&mut self) -> bool {
        let pending = self.viewport.take_pending();
        if let Some((primary, cross)) = pending.resize {
            self.apply_resize(primary, cross);
        }
        if let Some(translation) = pending.scroll {
            self.viewport.set_translation(translation);
        }
        !pending.is_empty()
    }

    /// Scroll immediately. Returns `true` if the translation moved.
    pub fn scroll_to(&mut self, translation: i64) -> bool {
        self.viewport.set_translation(translation)
    }

    /// Content coordinate shown at the viewport's leading edge.
    pub fn translation(&self) -> i64 {
        self.viewport.translation()
    }

    /// Total primary extent of all groups.
    pub fn content_extent(&self) -> i64 {
        self.layout.content_extent()
    }

    fn apply_resize(&mut self, primary: i32, cross: i32) {
        let old_extent = self.layout.content_extent();
        self.viewport.set_viewport_size(primary, cross);
        if self.layout.set_cross_extent(cross) {
            let new_extent = self.layout.full_recompute(&self.tree);
            self.viewport
                .adjust_for_resize(old_extent, new_extent, self.config.keep_location_on_resize);
        } else {
            self.viewport.validate();
        }
    }

    fn relayout_all(&mut self) {
        let extent = self.layout.full_recompute(&self.tree);
        self.viewport.set_content_extent(extent);
        self.viewport.validate();
    }

    fn relayout_group(&mut self, index: usize) -> i64 {
        let delta = self.layout.relayout_group(&self.tree, index);
        self.viewport.set_content_extent(self.layout.content_extent());
        self.viewport.validate();
        delta
    }

    fn relayout_owner(&mut self, id: ItemId) {
        if let Some(index) = self.tree.group_index_of(id) {
            self.relayout_group(index);
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Number of top-level slots, realized or not.
    pub fn item_count(&self) -> usize {
        self.tree.roots.len()
    }

    /// Reported child count of `group`.
    pub fn child_count(&self, group: ItemId) -> Option<usize> {
        self.tree.group(group).ok().map(VirtualGroup::child_count)
    }

    /// Add a top-level group at `position`, or append when `None`.
    pub fn add_group(&mut self, content: ItemContent, position: Option<usize>) -> Result<ItemId> {
        let count = self.tree.roots.len();
        let position = position.unwrap_or(count);
        if position > count {
            return Err(GalleryError::InvalidRange { position, count });
        }
        let id = self.tree.nodes.insert(Node::group(content, VirtualGroup::new()));
        self.tree.roots.insert(id, Some(position))?;
        self.selection.group_inserted(position);
        self.layout.insert_group(&self.tree, position);
        self.viewport.set_content_extent(self.layout.content_extent());
        self.viewport.validate();
        tracing::debug!(target: targets::COLLECTION, position, "group added");
        Ok(id)
    }

    /// Add a child to `group` at `position`, or append when `None`.
    ///
    /// A dummy group keeps its placeholder count as unrealized slots.
    pub fn add_item(&mut self, group: ItemId, content: ItemContent, position: Option<usize>) -> Result<ItemId> {
        let count = self.tree.group(group)?.child_count();
        let position = position.unwrap_or(count);
        if position > count {
            return Err(GalleryError::InvalidRange { position, count });
        }
        let id = self.tree.nodes.insert(Node::child(group, content));
        self.tree.group_mut(group)?.children_mut().insert(id, Some(position))?;
        self.selection.child_inserted(group, position);
        self.relayout_owner(group);
        tracing::trace!(target: targets::COLLECTION, position, "item added");
        Ok(id)
    }

    /// Remove a group or item. Its selection is dropped first.
    pub fn remove(&mut self, id: ItemId) -> Result<()> {
        let parent = self.tree.nodes.get(id).ok_or(GalleryError::NullArgument)?.parent;
        match parent {
            None => {
                let index = self.tree.roots.index_of(id).ok_or(GalleryError::NullArgument)?;
                self.remove_at(index)
            }
            Some(parent) => {
                let index = self
                    .tree
                    .group(parent)?
                    .children()
                    .index_of(id)
                    .ok_or(GalleryError::NullArgument)?;
                self.remove_child_at(parent, index)
            }
        }
    }

    /// Remove the top-level slot at `position`.
    pub fn remove_at(&mut self, position: usize) -> Result<()> {
        let count = self.tree.roots.len();
        let slot = self
            .tree
            .roots
            .get(position)
            .ok_or(GalleryError::InvalidRange { position, count })?;
        let disposed = match slot {
            Slot::Realized(id) => {
                self.realization.cancel(id);
                self.tree.subtree(id)
            }
            Slot::Unrealized => Vec::new(),
        };
        self.selection.evict(&disposed);
        self.tree.roots.remove_at(position)?;
        self.selection.group_removed(position);
        self.tree.dispose(&disposed);
        self.layout.remove_group(position);
        self.viewport.set_content_extent(self.layout.content_extent());
        self.viewport.validate();
        tracing::debug!(target: targets::COLLECTION, position, disposed = disposed.len(), "group removed");
        Ok(())
    }

    /// Remove child `position` of `group`.
    pub fn remove_child_at(&mut self, group: ItemId, position: usize) -> Result<()> {
        let count = self.tree.group(group)?.child_count();
        if position >= count {
            return Err(GalleryError::InvalidRange { position, count });
        }
        let removed = self.tree.group(group)?.child(position).and_then(Slot::key);
        if let Some(child) = removed {
            self.selection.evict(&[child]);
        }
        self.tree.group_mut(group)?.children_mut().remove_at(position)?;
        self.selection.child_removed(group, position);
        if let Some(child) = removed {
            self.tree.dispose(&[child]);
        }
        self.relayout_owner(group);
        Ok(())
    }

    /// Dispose every group and item.
    pub fn remove_all(&mut self) {
        let all: Vec<ItemId> = self.tree.nodes.keys().collect();
        self.selection.evict(&all);
        self.realization.invalidate();
        self.tree.nodes.clear();
        self.tree.roots.clear();
        self.relayout_all();
        self.viewport.set_translation(0);
        tracing::debug!(target: targets::COLLECTION, disposed = all.len(), "all items removed");
    }

    /// Resize the top-level collection to `count` slots.
    ///
    /// Existing groups keep their positions; new slots are unrealized and
    /// are laid out as expanded groups of the default child count.
    pub fn set_count(&mut self, count: usize) {
        let dropped = self.tree.roots.set_count(count);
        let disposed = self.tree.subtrees(&dropped);
        for id in &dropped {
            self.realization.cancel(*id);
        }
        self.selection.evict(&disposed);
        self.tree.dispose(&disposed);
        self.relayout_all();
        tracing::debug!(target: targets::COLLECTION, count, disposed = disposed.len(), "top-level count set");
    }

    /// Resize the concrete child list of `group`.
    pub fn set_child_count(&mut self, group: ItemId, count: usize) -> Result<()> {
        let dropped = self.tree.group_mut(group)?.set_child_count(count);
        self.selection.evict(&dropped);
        self.tree.dispose(&dropped);
        self.relayout_owner(group);
        Ok(())
    }

    /// Turn `group` into a dummy reporting `count` children until realized.
    pub fn set_virtual_child_count(&mut self, group: ItemId, count: usize) -> Result<()> {
        let dropped = self.tree.group_mut(group)?.set_virtual_child_count(count);
        self.selection.evict(&dropped);
        self.tree.dispose(&dropped);
        self.relayout_owner(group);
        Ok(())
    }

    /// Replace the content of a group or item.
    pub fn set_content(&mut self, id: ItemId, content: ItemContent) -> Result<()> {
        let node = self.tree.nodes.get_mut(id).ok_or(GalleryError::NullArgument)?;
        node.content = content;
        self.relayout_owner(id);
        Ok(())
    }

    /// Expand or collapse `group`.
    pub fn set_expanded(&mut self, group: ItemId, expanded: bool) -> Result<()> {
        if self.tree.group_mut(group)?.set_expanded(expanded) {
            self.relayout_owner(group);
            self.signals.expand_changed.emit((group, expanded));
        }
        Ok(())
    }

    /// Expansion flag of `group`; `None` for items and stale ids.
    pub fn is_expanded(&self, group: ItemId) -> Option<bool> {
        self.tree.group(group).ok().map(VirtualGroup::is_expanded)
    }

    /// Clear the whole gallery's content and the selection.
    ///
    /// In virtual mode every top-level slot goes back to unrealized, to be
    /// fetched again. Otherwise groups keep their structure and their content
    /// is reset (children too when `all_children`).
    pub fn clear_all(&mut self, all_children: bool) {
        self.selection.deselect_all(true);
        if self.config.virtual_mode {
            let reset = self.tree.roots.reset();
            let disposed = self.tree.subtrees(&reset);
            self.tree.dispose(&disposed);
            self.realization.invalidate();
        } else {
            let roots: Vec<ItemId> = self.tree.roots.realized().map(|(_, id)| id).collect();
            for id in roots {
                self.reset_content(id, all_children);
            }
        }
        self.relayout_all();
    }

    /// Clear one top-level slot and the selection.
    pub fn clear(&mut self, position: usize, all_children: bool) -> Result<()> {
        let count = self.tree.roots.len();
        let slot = self
            .tree
            .roots
            .get(position)
            .ok_or(GalleryError::InvalidRange { position, count })?;
        self.selection.deselect_all(true);
        if let Slot::Realized(id) = slot {
            if self.config.virtual_mode {
                self.realization.cancel(id);
                let disposed = self.tree.subtree(id);
                self.tree.roots.unrealize(position);
                self.tree.dispose(&disposed);
            } else {
                self.reset_content(id, all_children);
            }
        }
        self.relayout_group(position);
        Ok(())
    }

    fn reset_content(&mut self, group: ItemId, all_children: bool) {
        let children: Vec<ItemId> = match self.tree.group(group) {
            Ok(group) if all_children => group.children().realized().map(|(_, id)| id).collect(),
            _ => Vec::new(),
        };
        for id in std::iter::once(group).chain(children) {
            if let Some(node) = self.tree.nodes.get_mut(id) {
                node.content = ItemContent::default();
            }
        }
    }

    // =========================================================================
    // Lookup and materialization
    // =========================================================================

    /// Top-level group at `position`.
    ///
    /// With `materialize`, an unrealized slot is realized first: as a dummy
    /// group when virtual groups are on, otherwise by fetching its content.
    pub fn get_item(&mut self, position: usize, materialize: bool) -> Option<ItemId> {
        match self.tree.roots.get(position)? {
            Slot::Realized(id) => Some(id),
            Slot::Unrealized if materialize => Some(self.materialize_group(position)),
            Slot::Unrealized => None,
        }
    }

    /// Child `index` of `group`, fetching it when `materialize` is set.
    ///
    /// A dummy group is realized synchronously before its child is fetched.
    pub fn get_child(&mut self, group: ItemId, index: usize, materialize: bool) -> Option<ItemId> {
        let slot = self.tree.group(group).ok()?.child(index)?;
        match slot {
            Slot::Realized(id) => Some(id),
            Slot::Unrealized if !materialize => None,
            Slot::Unrealized => {
                self.ensure_concrete(group);
                let (id, fetched) = self.fetch_child(group, index)?;
                if fetched && let Some(group_index) = self.tree.roots.index_of(group) {
                    self.relayout_group(group_index);
                }
                Some(id)
            }
        }
    }

    /// Child `index` of a concrete group, fetched from the provider when its
    /// slot is unrealized. The flag is `true` after a fetch; the caller owns
    /// the relayout.
    fn fetch_child(&mut self, group: ItemId, index: usize) -> Option<(ItemId, bool)> {
        if let Slot::Realized(id) = self.tree.group(group).ok()?.child(index)? {
            return Some((id, false));
        }
        let group_index = self.tree.roots.index_of(group)?;
        let content = match self.call_provider(|provider| provider.fetch_item(group_index, index)) {
            Some(Ok(content)) => content,
            Some(Err(error)) => {
                tracing::warn!(target: targets::REALIZE, %error, group_index, index, "item fetch failed");
                ItemContent::default()
            }
            None => ItemContent::default(),
        };
        let id = self.tree.nodes.insert(Node::child(group, content));
        self.tree.group_mut(group).ok()?.children_mut().set(index, id).ok()?;
        Some((id, true))
    }

    /// Position of `id` within its parent (or among the top-level groups).
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        let node = self.tree.nodes.get(id)?;
        match node.parent {
            None => self.tree.roots.index_of(id),
            Some(parent) => self.tree.group(parent).ok()?.children().index_of(id),
        }
    }

    /// Owning group of a child item; `None` for top-level groups.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.tree.nodes.get(id)?.parent
    }

    /// Group and child position of `id`.
    pub fn item_path(&self, id: ItemId) -> Option<ItemPath> {
        self.tree.path_of(id)
    }

    /// Display content of a group or item.
    pub fn content(&self, id: ItemId) -> Option<&ItemContent> {
        self.tree.nodes.get(id).map(|node| &node.content)
    }

    /// `id` is a live top-level group.
    pub fn is_group(&self, id: ItemId) -> bool {
        self.tree.group(id).is_ok()
    }

    /// Whether `group` still reports a placeholder child count.
    pub fn is_dummy(&self, group: ItemId) -> bool {
        self.tree.group(group).is_ok_and(VirtualGroup::is_dummy)
    }

    /// `Realized` while `id` resolves, `Disposed` afterwards.
    pub fn state(&self, id: ItemId) -> MaterializationState {
        if self.tree.nodes.contains_key(id) {
            MaterializationState::Realized
        } else {
            MaterializationState::Disposed
        }
    }

    /// State of the top-level slot at `position`.
    pub fn slot_state(&self, position: usize) -> Option<MaterializationState> {
        self.tree.roots.get(position).map(|slot| match slot {
            Slot::Realized(_) => MaterializationState::Realized,
            Slot::Unrealized => MaterializationState::Unrealized,
        })
    }

    /// Number of realized top-level groups.
    pub fn realized_group_count(&self) -> usize {
        self.tree.roots.realized_count()
    }

    /// Item style with group and gallery defaults filled in.
    pub fn resolve_style(&self, id: ItemId) -> Option<ResolvedStyle> {
        let node = self.tree.nodes.get(id)?;
        let mut style = node.content.style.clone();
        if let Some(parent) = node.parent.and_then(|parent| self.tree.nodes.get(parent)) {
            style = style.inherit(&parent.content.style);
        }
        let defaults = &self.config.style;
        Some(ResolvedStyle {
            font: style.font.unwrap_or_else(|| defaults.font.clone()),
            foreground: style.foreground.unwrap_or(defaults.foreground),
            background: style.background.unwrap_or(defaults.background),
        })
    }

    fn call_provider<R>(&mut self, call: impl FnOnce(&mut dyn ContentProvider) -> R) -> Option<R> {
        let mut provider = self.provider.take()?;
        let result = call(provider.as_mut());
        self.provider = Some(provider);
        Some(result)
    }

    /// Fetch the group at `index`. A failure is logged and yields an empty
    /// group; without a provider the group keeps what it already has.
    fn fetch_group(&mut self, group: ItemId, index: usize) -> (GroupData, bool) {
        match self.call_provider(|provider| provider.fetch_group(index)) {
            Some(Ok(data)) => (data, false),
            Some(Err(error)) => {
                log_group_failure(index, &error);
                (GroupData::empty(), true)
            }
            None => (self.current_data(group), false),
        }
    }

    fn current_data(&self, group: ItemId) -> GroupData {
        let header = self.content(group).cloned().unwrap_or_default();
        GroupData::lazy(header, self.child_count(group).unwrap_or(0))
    }

    fn materialize_group(&mut self, position: usize) -> ItemId {
        let group = if self.config.virtual_groups {
            VirtualGroup::dummy(self.config.virtual_group_default_item_count)
        } else {
            VirtualGroup::new()
        };
        let id = self.tree.nodes.insert(Node::group(ItemContent::default(), group));
        // position comes from a successful slot lookup
        let _ = self.tree.roots.set(position, id);
        if !self.config.virtual_groups {
            let (data, _) = self.fetch_group(id, position);
            self.install(id, data);
            self.relayout_group(position);
        }
        tracing::trace!(target: targets::REALIZE, position, dummy = self.config.virtual_groups, "group materialized");
        id
    }

    /// Realize a dummy group now, bypassing the queue.
    fn ensure_concrete(&mut self, group: ItemId) {
        if !self.is_dummy(group) {
            return;
        }
        let Some(index) = self.tree.roots.index_of(group) else {
            return;
        };
        self.realization.cancel(group);
        let (data, failed) = self.fetch_group(group, index);
        self.finish_realization(group, index, data, failed);
    }

    /// Replace a group's content and children with fetched data.
    fn install(&mut self, group: ItemId, data: GroupData) {
        let GroupData { header, children } = data;
        let count = children.len();
        let eager: Vec<ItemId> = match children {
            GroupChildren::Lazy(_) => Vec::new(),
            GroupChildren::Eager(contents) => contents
                .into_iter()
                .map(|content| self.tree.nodes.insert(Node::child(group, content)))
                .collect(),
        };
        let Some(node) = self.tree.nodes.get_mut(group) else {
            return;
        };
        node.content = header;
        let Some(slots) = node.group.as_mut() else {
            return;
        };
        let (_, dropped) = slots.realize(count);
        for (index, child) in eager.into_iter().enumerate() {
            // realize() just sized the slots to `count`
            let _ = slots.children_mut().set(index, child);
        }
        self.selection.evict(&dropped);
        self.tree.dispose(&dropped);
    }

    fn finish_realization(&mut self, group: ItemId, index: usize, data: GroupData, failed: bool) -> RealizationOutcome {
        let _span = PerfSpan::new(span_names::REALIZE_GROUP);
        let anchors = self
            .layout
            .geometry(index)
            .is_some_and(|geometry| geometry.offset < self.viewport.translation());
        self.install(group, data);
        let delta = self.layout.relayout_group(&self.tree, index);
        self.viewport.set_content_extent(self.layout.content_extent());
        let translation_adjusted = anchors && delta != 0;
        if translation_adjusted {
            self.viewport.translate_by(delta);
        } else {
            self.viewport.validate();
        }
        tracing::debug!(target: targets::REALIZE, index, delta, translation_adjusted, "group realized");
        RealizationOutcome {
            delta,
            translation_adjusted,
            failed,
        }
    }

    // =========================================================================
    // Paint pass and realization
    // =========================================================================

    fn clip_range(&self, clip: Rect) -> (i64, i64) {
        let (start, end) = match self.config.orientation {
            Orientation::Vertical => (clip.y, clip.bottom()),
            Orientation::Horizontal => (clip.x, clip.right()),
        };
        let translation = self.viewport.translation();
        (i64::from(start) + translation, i64::from(end) + translation)
    }

    /// Top-level positions of the groups intersecting `clip` (viewport
    /// coordinates). Does not materialize anything.
    pub fn visible_indices(&self, clip: Rect) -> Vec<usize> {
        let (start, end) = self.clip_range(clip);
        self.layout.visible_groups(start, end).collect()
    }

    /// Prepare a paint pass over `clip`.
    ///
    /// Unrealized slots in the clip are materialized (virtual mode), and a
    /// realization request is filed for every visible dummy group. The
    /// returned list describes what to paint.
    pub fn prepare_paint(&mut self, clip: Rect) -> Vec<VisibleGroup> {
        let _span = PerfSpan::new(span_names::PREPARE_PAINT);
        let visible = self.visible_indices(clip);
        let touched = match visible.last() {
            // compatibility mode realizes everything up to the last visible group
            Some(&last) if self.config.compatibility_mode => (0..last + 1).collect(),
            _ => visible,
        };
        for index in touched {
            self.touch_for_paint(index);
        }

        let (start, end) = self.clip_range(clip);
        let translation = self.viewport.translation();
        let orientation = self.config.orientation;
        self.layout
            .visible_groups(start, end)
            .map(|index| {
                let group = self.tree.roots.key_at(index);
                let bounds = self
                    .layout
                    .group_bounds(index)
                    .unwrap_or_default()
                    .translated(-translation)
                    .to_rect(orientation);
                VisibleGroup {
                    index,
                    group,
                    bounds,
                    children: self.layout.visible_children(index, start, end),
                    realizing: group.is_some_and(|id| self.realization.is_in_flight(id)),
                }
            })
            .collect()
    }

    fn touch_for_paint(&mut self, index: usize) {
        let id = match self.tree.roots.get(index) {
            Some(Slot::Realized(id)) => id,
            Some(Slot::Unrealized) if self.config.virtual_mode => self.materialize_group(index),
            _ => return,
        };
        if self.is_dummy(id) {
            self.realization.request(id, index);
        }
    }

    /// Hand out the next batch of realization requests.
    pub fn pending_realizations(&mut self) -> Vec<RealizationTicket> {
        self.realization.take_batch()
    }

    /// Realization requests wait to be handed out.
    pub fn has_pending_realizations(&self) -> bool {
        self.realization.has_pending()
    }

    /// Apply a realization result.
    ///
    /// A failed fetch realizes the group empty and is only logged. When the
    /// group starts before the viewport, the translation follows the extent
    /// change so the visible content does not jump.
    pub fn apply_realization(
        &mut self,
        ticket: RealizationTicket,
        result: std::result::Result<GroupData, ProviderError>,
    ) -> Result<RealizationOutcome> {
        self.realization.complete(&ticket)?;
        if !self.is_dummy(ticket.group) {
            return Err(GalleryError::StaleRealization);
        }
        let index = self
            .tree
            .roots
            .index_of(ticket.group)
            .ok_or(GalleryError::StaleRealization)?;
        let (data, failed) = match result {
            Ok(data) => (data, false),
            Err(error) => {
                log_group_failure(index, &error);
                (GroupData::empty(), true)
            }
        };
        Ok(self.finish_realization(ticket.group, index, data, failed))
    }

    /// Fetch and apply every queued realization using the gallery's provider.
    ///
    /// Returns the number of groups realized.
    pub fn realize_pending(&mut self) -> usize {
        let mut realized = 0;
        while self.realization.has_pending() {
            for ticket in self.realization.take_batch() {
                let Some(index) = self.tree.roots.index_of(ticket.group) else {
                    continue;
                };
                let result = match self.call_provider(|provider| provider.fetch_group(index)) {
                    Some(result) => result,
                    None => Ok(self.current_data(ticket.group)),
                };
                match self.apply_realization(ticket, result) {
                    Ok(_) => realized += 1,
                    Err(error) => tracing::debug!(target: targets::REALIZE, %error, "realization skipped"),
                }
            }
        }
        realized
    }

    // =========================================================================
    // Hit testing and bounds
    // =========================================================================

    /// Position of the item under a viewport point, realized or not.
    pub fn item_at(&self, x: i32, y: i32) -> Option<ItemPath> {
        let (primary, cross) = self.config.orientation.split(x, y);
        let primary = i64::from(primary) + self.viewport.translation();
        let group = self.layout.group_at(primary)?;
        let index = self.layout.hit_item(group, primary, cross)?;
        Some(ItemPath::child(group, index))
    }

    /// Item under a viewport point, materializing it if needed.
    pub fn hit_test(&mut self, x: i32, y: i32) -> Option<ItemId> {
        let path = self.item_at(x, y)?;
        let group = self.get_item(path.group, true)?;
        self.get_child(group, path.child?, true)
    }

    /// Realized group under a viewport point.
    pub fn group_at(&self, x: i32, y: i32) -> Option<ItemId> {
        let (primary, _) = self.config.orientation.split(x, y);
        let index = self.layout.group_at(i64::from(primary) + self.viewport.translation())?;
        self.tree.roots.key_at(index)
    }

    /// Bounds of a group or item in viewport coordinates.
    pub fn item_bounds(&self, id: ItemId) -> Option<Rect> {
        let rect = match self.tree.path_of(id)? {
            ItemPath { group, child: None } => self.layout.group_bounds(group)?,
            ItemPath {
                group,
                child: Some(index),
            } => self.layout.item_rect(group, index)?,
        };
        Some(rect.translated(-self.viewport.translation()).to_rect(self.config.orientation))
    }

    /// Scroll so that `id` is fully visible, expanding its group if needed.
    pub fn show_item(&mut self, id: ItemId) -> bool {
        if let Some(parent) = self.parent(id)
            && self.is_expanded(parent) == Some(false)
        {
            // parent exists, so this cannot fail
            let _ = self.set_expanded(parent, true);
        }
        let rect = match self.tree.path_of(id) {
            Some(ItemPath { group, child: None }) => self.layout.group_bounds(group),
            Some(ItemPath {
                group,
                child: Some(index),
            }) => self.layout.item_rect(group, index),
            None => None,
        };
        match rect {
            Some(rect) => self.viewport.ensure_visible(rect.primary, rect.primary_extent),
            None => false,
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// `id` is in the current selection.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected ids in selection order.
    pub fn selected_items(&self) -> &[ItemId] {
        self.selection.selected_items()
    }

    /// Select `id`; absent items are ignored.
    pub fn select(&mut self, id: ItemId, additive: bool) {
        let entry = self.tree.entry(id);
        self.selection.select(entry, additive);
    }

    /// Flip the selection state of `id`, keeping the rest.
    pub fn toggle(&mut self, id: ItemId) {
        let entry = self.tree.entry(id);
        self.selection.toggle(entry);
    }

    /// Remove `id` from the selection.
    pub fn deselect(&mut self, id: ItemId) {
        self.selection.deselect(id);
    }

    /// Clear the selection; `notify` controls the change signal.
    pub fn deselect_all(&mut self, notify: bool) {
        self.selection.deselect_all(notify);
    }

    /// Select everything between `a` and `b`, materializing the items in
    /// between.
    pub fn select_range(&mut self, a: ItemId, b: ItemId, additive: bool) {
        let (Some(from), Some(to)) = (self.tree.path_of(a), self.tree.path_of(b)) else {
            return;
        };
        let (lo, hi) = (from.min(to), from.max(to));
        self.materialize_range(lo, hi);
        // materializing can realize dummies; positions of a and b are stable
        self.selection.select_range(from, to, &self.tree, additive);
    }

    fn materialize_range(&mut self, lo: ItemPath, hi: ItemPath) {
        if self.selection.mode() == SelectionMode::Single {
            return;
        }
        let groups_only = lo.is_group() && hi.is_group();
        for index in lo.group..=hi.group {
            let Some(group) = self.get_item(index, true) else {
                continue;
            };
            if groups_only {
                continue;
            }
            self.ensure_concrete(group);
            let count = self.child_count(group).unwrap_or(0);
            let from = if index == lo.group { lo.child.unwrap_or(0) } else { 0 };
            let to = match (index == hi.group, hi.child) {
                (true, Some(end)) => (end + 1).min(count),
                // a group endpoint covers the group, not its children
                (true, None) => 0,
                _ => count,
            };
            let mut fetched = false;
            for child in from..to {
                fetched |= self.fetch_child(group, child).is_some_and(|(_, new)| new);
            }
            if fetched {
                self.relayout_group(index);
            }
        }
    }

    /// Select every realized group and item (multi mode only).
    pub fn select_all(&mut self) {
        if self.selection.mode() != SelectionMode::Multi {
            return;
        }
        let entries: Vec<_> = self
            .tree
            .roots
            .realized()
            .flat_map(|(_, group)| self.tree.subtree(group))
            .filter_map(|id| self.tree.entry(id))
            .collect();
        self.selection.select_many(entries);
    }

    /// Replace the selection with `items`, scroll the last one into view and
    /// make it the range anchor.
    pub fn set_selection(&mut self, items: &[ItemId]) {
        let entries: Vec<_> = items.iter().filter_map(|&id| self.tree.entry(id)).collect();
        let last = entries.last().map(|entry| entry.id);
        self.selection.replace(entries);
        if let Some(last) = last {
            self.show_item(last);
        }
        self.selection.set_anchor(last);
    }

    /// Handle a click on `target` (`None` for empty space).
    ///
    /// - plain: select only the target, make it the anchor
    /// - toggle: flip the target, make it the anchor
    /// - range: select from the anchor to the target (added to the current
    ///   selection when toggle is held too)
    pub fn click(&mut self, target: Option<ItemId>, modifiers: ClickModifiers) {
        let Some(id) = target else {
            self.selection.deselect_all(true);
            return;
        };
        if !self.tree.nodes.contains_key(id) {
            return;
        }
        let anchor = self
            .selection
            .anchor()
            .filter(|anchor| self.tree.nodes.contains_key(*anchor));
        match anchor {
            Some(anchor) if modifiers.range && self.selection.mode() == SelectionMode::Multi => {
                self.select_range(anchor, id, modifiers.toggle);
            }
            _ if modifiers.toggle => {
                self.toggle(id);
                self.selection.set_anchor(Some(id));
            }
            _ => {
                self.select(id, false);
                self.selection.set_anchor(Some(id));
            }
        }
    }

    /// Emit `default_action` for `id`.
    pub fn activate(&mut self, id: ItemId) {
        if self.tree.nodes.contains_key(id) {
            self.signals.default_action.emit(id);
        }
    }
}

fn log_group_failure(index: usize, error: &ProviderError) {
    tracing::warn!(target: targets::REALIZE, %error, index, "group fetch failed, realizing empty");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Color, ItemStyle};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Groups of `per_group` lazily fetched children.
    struct Photos {
        per_group: usize,
    }

    impl ContentProvider for Photos {
        fn fetch_group(&mut self, group_index: usize) -> std::result::Result<GroupData, ProviderError> {
            Ok(GroupData::lazy(ItemContent::titled(format!("group {group_index}")), self.per_group))
        }

        fn fetch_item(&mut self, group_index: usize, item_index: usize) -> std::result::Result<ItemContent, ProviderError> {
            Ok(ItemContent::titled(format!("{group_index}/{item_index}")))
        }
    }

    struct Offline;

    impl ContentProvider for Offline {
        fn fetch_group(&mut self, _group_index: usize) -> std::result::Result<GroupData, ProviderError> {
            Err(ProviderError::Other("offline".into()))
        }

        fn fetch_item(&mut self, _group_index: usize, _item_index: usize) -> std::result::Result<ItemContent, ProviderError> {
            Err(ProviderError::Other("offline".into()))
        }
    }

    const VIEWPORT: Rect = Rect::new(0, 0, 300, 200);

    fn gallery() -> Gallery {
        let mut gallery = Gallery::new(GalleryConfig {
            selection_mode: SelectionMode::Multi,
            ..GalleryConfig::default()
        });
        gallery.set_viewport_size(300, 200);
        gallery
    }

    fn virtual_gallery(per_group: usize) -> Gallery {
        let mut gallery = Gallery::with_provider(GalleryConfig::virtual_groups(), Photos { per_group });
        gallery.set_viewport_size(300, 200);
        gallery
    }

    fn populate(gallery: &mut Gallery, counts: &[usize]) -> Vec<(ItemId, Vec<ItemId>)> {
        let mut groups = Vec::new();
        for (index, &count) in counts.iter().enumerate() {
            let group = gallery
                .add_group(ItemContent::titled(format!("group {index}")), None)
                .unwrap();
            let mut children = Vec::new();
            for child in 0..count {
                let id = gallery
                    .add_item(group, ItemContent::titled(format!("{index}/{child}")), None)
                    .unwrap();
                children.push(id);
            }
            groups.push((group, children));
        }
        groups
    }

    fn counter<T: 'static>(signal: &Signal<T>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    // 4 columns at 300 wide; header 19, one line of items 58.

    #[test]
    fn test_add_items_updates_layout() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[5]);
        assert_eq!(gallery.item_count(), 1);
        assert_eq!(gallery.child_count(groups[0].0), Some(5));
        assert_eq!(gallery.content_extent(), 19 + 2 * 58);
        assert_eq!(gallery.index_of(groups[0].1[3]), Some(3));
        assert_eq!(gallery.parent(groups[0].1[3]), Some(groups[0].0));
    }

    #[test]
    fn test_insert_group_at_front() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[0, 0, 0]);
        let front = gallery.add_group(ItemContent::titled("x"), Some(0)).unwrap();

        assert_eq!(gallery.index_of(front), Some(0));
        assert_eq!(gallery.index_of(groups[0].0), Some(1));
        assert_eq!(gallery.index_of(groups[2].0), Some(3));
        assert_eq!(
            gallery.add_group(ItemContent::default(), Some(9)),
            Err(GalleryError::InvalidRange { position: 9, count: 4 })
        );
    }

    #[test]
    fn test_add_item_errors() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[1]);
        let child = groups[0].1[0];
        assert_eq!(
            gallery.add_item(child, ItemContent::default(), None),
            Err(GalleryError::NotAGroup)
        );

        gallery.remove(groups[0].0).unwrap();
        assert_eq!(
            gallery.add_item(groups[0].0, ItemContent::default(), None),
            Err(GalleryError::NullArgument)
        );
        assert_eq!(gallery.remove(groups[0].0), Err(GalleryError::NullArgument));
    }

    #[test]
    fn test_remove_group_evicts_selection_once() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[3, 2]);
        gallery.select(groups[0].1[0], true);
        gallery.select(groups[0].1[2], true);
        let count = counter(&gallery.selection().selection_changed);

        gallery.remove(groups[0].0).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(gallery.selected_items().is_empty());
        assert_eq!(gallery.state(groups[0].1[0]), MaterializationState::Disposed);
        assert_eq!(gallery.index_of(groups[1].0), Some(0));
        assert_eq!(gallery.content_extent(), 19 + 58);
    }

    #[test]
    fn test_remove_child_shifts_selection() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[4]);
        let last = groups[0].1[3];
        gallery.select(last, false);

        gallery.remove(groups[0].1[1]).unwrap();
        assert!(gallery.is_selected(last));
        assert_eq!(gallery.selection().path_of(last), Some(ItemPath::child(0, 2)));
        assert_eq!(gallery.selection().indices_in_group(groups[0].0), &[2]);
    }

    #[test]
    fn test_virtual_count_materializes_visible_groups_only() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(1_000_000);

        // unrealized groups count the default ten children: 19 + 3 * 58
        assert_eq!(gallery.content_extent(), 1_000_000 * 193);
        assert_eq!(gallery.realized_group_count(), 0);

        let visible = gallery.prepare_paint(VIEWPORT);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|group| group.realizing));
        assert_eq!(gallery.realized_group_count(), 2);
        assert_eq!(gallery.slot_state(2), Some(MaterializationState::Unrealized));

        assert_eq!(gallery.realize_pending(), 2);
        let first = gallery.get_item(0, false).unwrap();
        assert!(!gallery.is_dummy(first));
        assert_eq!(gallery.child_count(first), Some(4));
        assert_eq!(gallery.content(first).unwrap().title(), "group 0");
        assert_eq!(gallery.content_extent(), 1_000_000 * 193 - 2 * 116);
    }

    #[test]
    fn test_realization_above_viewport_moves_translation() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(100);
        gallery.scroll_to(1000);

        gallery.prepare_paint(VIEWPORT);
        let tickets = gallery.pending_realizations();
        assert_eq!(tickets.iter().map(|t| t.group_index).collect::<Vec<_>>(), vec![5, 6]);

        // group 5 starts at 965, above the viewport
        let outcome = gallery
            .apply_realization(tickets[0], Ok(GroupData::lazy(ItemContent::titled("five"), 4)))
            .unwrap();
        assert_eq!(outcome.delta, -116);
        assert!(outcome.translation_adjusted);
        assert_eq!(gallery.translation(), 884);

        let outcome = gallery
            .apply_realization(tickets[1], Ok(GroupData::lazy(ItemContent::titled("six"), 4)))
            .unwrap();
        assert!(!outcome.translation_adjusted);
        assert_eq!(gallery.translation(), 884);
    }

    #[test]
    fn test_stale_realization_is_rejected() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(10);
        gallery.prepare_paint(VIEWPORT);
        let tickets = gallery.pending_realizations();

        assert!(gallery.apply_realization(tickets[0], Ok(GroupData::empty())).is_ok());
        assert_eq!(
            gallery.apply_realization(tickets[0], Ok(GroupData::empty())),
            Err(GalleryError::StaleRealization)
        );

        gallery.remove_all();
        assert_eq!(
            gallery.apply_realization(tickets[1], Ok(GroupData::empty())),
            Err(GalleryError::StaleRealization)
        );
        assert_eq!(gallery.item_count(), 0);
    }

    #[test]
    fn test_failed_fetch_realizes_empty() {
        let mut gallery = Gallery::with_provider(GalleryConfig::virtual_groups(), Offline);
        gallery.set_viewport_size(300, 200);
        gallery.set_count(3);
        gallery.prepare_paint(VIEWPORT);
        let tickets = gallery.pending_realizations();

        let outcome = gallery
            .apply_realization(tickets[0], Err(ProviderError::Other("offline".into())))
            .unwrap();
        assert!(outcome.failed);
        let group = gallery.get_item(0, false).unwrap();
        assert_eq!(gallery.child_count(group), Some(0));
        assert!(!gallery.is_dummy(group));
    }

    #[test]
    fn test_get_child_realizes_dummy() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(3);
        let group = gallery.get_item(1, true).unwrap();
        assert!(gallery.is_dummy(group));
        assert_eq!(gallery.get_child(group, 2, false), None);

        let child = gallery.get_child(group, 2, true).unwrap();
        assert!(!gallery.is_dummy(group));
        assert_eq!(gallery.content(child).unwrap().title(), "1/2");
        assert_eq!(gallery.item_path(child), Some(ItemPath::child(1, 2)));
        assert_eq!(gallery.get_child(group, 2, true), Some(child));
        assert_eq!(gallery.get_child(group, 7, true), None);
    }

    #[test]
    fn test_click_modifiers() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[6]);
        let c = &groups[0].1;

        gallery.click(Some(c[1]), ClickModifiers::NONE);
        assert_eq!(gallery.selected_items(), &[c[1]]);

        gallery.click(Some(c[4]), ClickModifiers::RANGE);
        assert_eq!(gallery.selection().indices_in_group(groups[0].0).len(), 4);
        assert_eq!(gallery.selection().anchor(), Some(c[1]));

        gallery.click(Some(c[5]), ClickModifiers::TOGGLE);
        assert_eq!(gallery.selected_items().len(), 5);
        assert_eq!(gallery.selection().anchor(), Some(c[5]));

        gallery.click(None, ClickModifiers::NONE);
        assert!(gallery.selected_items().is_empty());
    }

    #[test]
    fn test_single_mode_click_range_selects_target() {
        let mut gallery = gallery();
        gallery.set_selection_mode(SelectionMode::Single);
        let groups = populate(&mut gallery, &[3]);
        gallery.click(Some(groups[0].1[0]), ClickModifiers::NONE);
        gallery.click(Some(groups[0].1[2]), ClickModifiers::RANGE);
        assert_eq!(gallery.selected_items(), &[groups[0].1[2]]);
    }

    #[test]
    fn test_expand_collapse() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[5]);
        let group = groups[0].0;
        let count = counter(&gallery.signals().expand_changed);

        gallery.set_expanded(group, false).unwrap();
        assert_eq!(gallery.content_extent(), 19);
        assert_eq!(gallery.is_expanded(group), Some(false));
        gallery.set_expanded(group, false).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        gallery.set_expanded(group, true).unwrap();
        assert_eq!(gallery.content_extent(), 19 + 2 * 58);
        assert_eq!(gallery.set_expanded(groups[0].1[0], true), Err(GalleryError::NotAGroup));
    }

    #[test]
    fn test_show_item_expands_and_scrolls() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[40]);
        let last = groups[0].1[39];
        gallery.set_expanded(groups[0].0, false).unwrap();

        assert!(gallery.show_item(last));
        assert_eq!(gallery.is_expanded(groups[0].0), Some(true));
        // line 9 starts at 19 + 9 * 58 = 541
        assert_eq!(gallery.translation(), 541 + 56 - 200);
        assert_eq!(gallery.item_bounds(last), Some(Rect::new(224, 144, 72, 56)));
    }

    #[test]
    fn test_set_selection_replaces_and_reveals() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[40]);
        let c = &groups[0].1;
        gallery.select(c[5], false);
        let count = counter(&gallery.selection().selection_changed);

        gallery.set_selection(&[c[0], c[39]]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(gallery.selected_items(), &[c[0], c[39]]);
        assert_eq!(gallery.selection().anchor(), Some(c[39]));
        assert_eq!(gallery.translation(), 397);
    }

    #[test]
    fn test_hit_testing() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[5]);
        assert_eq!(gallery.item_at(10, 25), Some(ItemPath::child(0, 0)));
        assert_eq!(gallery.hit_test(10, 25), Some(groups[0].1[0]));
        assert_eq!(gallery.hit_test(80, 25), Some(groups[0].1[1]));
        // in the margin between two columns
        assert_eq!(gallery.item_at(75, 25), None);
        assert_eq!(gallery.group_at(10, 5), Some(groups[0].0));
        assert_eq!(gallery.group_at(10, 190), None);
    }

    #[test]
    fn test_resolve_style_inherits() {
        let mut gallery = gallery();
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let mut header = ItemContent::titled("g");
        header.style = ItemStyle {
            foreground: Some(red),
            ..ItemStyle::default()
        };
        let group = gallery.add_group(header, None).unwrap();
        let mut content = ItemContent::titled("c");
        content.style.background = Some(blue);
        let child = gallery.add_item(group, content, None).unwrap();

        let style = gallery.resolve_style(child).unwrap();
        assert_eq!(style.foreground, red);
        assert_eq!(style.background, blue);
        assert_eq!(style.font, gallery.config().style.font);
        assert_eq!(gallery.resolve_style(group).unwrap().background, gallery.config().style.background);
    }

    #[test]
    fn test_clear_all_resets_content() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[2]);
        gallery.select(groups[0].1[1], false);

        gallery.clear_all(true);
        assert!(gallery.selected_items().is_empty());
        assert_eq!(gallery.content(groups[0].0), Some(&ItemContent::default()));
        assert_eq!(gallery.content(groups[0].1[1]), Some(&ItemContent::default()));
        assert_eq!(gallery.child_count(groups[0].0), Some(2));
    }

    #[test]
    fn test_clear_all_virtual_unrealizes() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(5);
        gallery.prepare_paint(VIEWPORT);
        gallery.realize_pending();
        let first = gallery.get_item(0, false).unwrap();

        gallery.clear_all(false);
        assert_eq!(gallery.realized_group_count(), 0);
        assert_eq!(gallery.state(first), MaterializationState::Disposed);
        assert_eq!(gallery.slot_state(0), Some(MaterializationState::Unrealized));
        assert_eq!(gallery.item_count(), 5);
        assert_eq!(gallery.content_extent(), 5 * 193);
    }

    #[test]
    fn test_clear_one_slot() {
        let mut gallery = virtual_gallery(4);
        gallery.set_count(5);
        let group = gallery.get_item(3, true).unwrap();
        gallery.clear(3, false).unwrap();
        assert_eq!(gallery.state(group), MaterializationState::Disposed);
        assert_eq!(
            gallery.clear(5, false),
            Err(GalleryError::InvalidRange { position: 5, count: 5 })
        );
    }

    #[test]
    fn test_set_count_shrink_evicts() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[1, 1, 1]);
        gallery.select(groups[2].1[0], false);

        gallery.set_count(2);
        assert_eq!(gallery.item_count(), 2);
        assert!(gallery.selected_items().is_empty());
        assert_eq!(gallery.state(groups[2].0), MaterializationState::Disposed);
        assert_eq!(gallery.content_extent(), 2 * (19 + 58));
    }

    #[test]
    fn test_select_all_and_range_across_groups() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[2, 3, 2]);
        gallery.select_range(groups[0].1[1], groups[2].1[0], false);
        assert_eq!(gallery.selected_items().len(), 5);
        assert!(!gallery.is_selected(groups[0].1[0]));

        gallery.select_all();
        assert_eq!(gallery.selected_items().len(), 3 + 7);
    }

    #[test]
    fn test_flush_applies_latest_requests() {
        let mut gallery = gallery();
        populate(&mut gallery, &[40]);
        gallery.request_scroll(50);
        gallery.request_scroll(120);
        assert!(gallery.flush());
        assert_eq!(gallery.translation(), 120);
        assert!(!gallery.flush());
    }

    #[test]
    fn test_resize_keeps_center() {
        let mut gallery = gallery();
        populate(&mut gallery, &[40]);
        gallery.scroll_to(200);

        // 8 columns: 5 lines, 309 total
        gallery.set_viewport_size(600, 200);
        assert_eq!(gallery.layout().columns(), 8);
        assert_eq!(gallery.content_extent(), 309);
        assert_eq!(gallery.translation(), 54);
    }

    #[test]
    fn test_activate_emits_default_action() {
        let mut gallery = gallery();
        let groups = populate(&mut gallery, &[1]);
        let count = counter(&gallery.signals().default_action);
        gallery.activate(groups[0].1[0]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    /// Counts header measurements, one per measured grid group.
    struct CountingMetrics(Arc<AtomicUsize>);

    impl RenderMetrics for CountingMetrics {
        fn font_height(&self, font: Option<&crate::item::FontSpec>) -> i32 {
            self.0.fetch_add(1, Ordering::SeqCst);
            font.map_or(12, |font| font.height)
        }
    }

    #[test]
    fn test_range_selection_measures_group_once() {
        let config = GalleryConfig {
            selection_mode: SelectionMode::Multi,
            ..GalleryConfig::default()
        };
        let mut gallery = Gallery::with_provider(config, Photos { per_group: 0 });
        gallery.set_viewport_size(300, 200);
        let measures = Arc::new(AtomicUsize::new(0));
        gallery.set_metrics(Box::new(CountingMetrics(measures.clone())));

        let group = gallery.add_group(ItemContent::titled("album"), None).unwrap();
        gallery.set_child_count(group, 50).unwrap();
        let first = gallery.get_child(group, 0, true).unwrap();
        let last = gallery.get_child(group, 49, true).unwrap();
        measures.store(0, Ordering::SeqCst);

        gallery.select_range(first, last, false);
        assert_eq!(gallery.selected_items().len(), 50);
        assert!(gallery.get_child(group, 25, false).is_some());
        assert_eq!(measures.load(Ordering::SeqCst), 1);
    }
}
