//! Selection model for the gallery.
//!
//! [`SelectionModel`] tracks selected items at two scopes: top-level groups
//! and children within a group. It keeps three views in sync:
//!
//! - the selected identities in selection order,
//! - the selected top-level group indices,
//! - the selected child indices of each group.
//!
//! Positions are stored as [`ItemPath`]s, which order a group before its own
//! children and after every child of the previous group. Range selection walks
//! that order, so a range can span group boundaries.
//!
//! # Example
//!
//! ```ignore
//! use lattice_gallery::{SelectionModel, SelectionMode};
//!
//! let mut selection = SelectionModel::new(SelectionMode::Multi);
//! selection.selection_changed.connect(|change| {
//!     println!("+{} -{}", change.selected.len(), change.deselected.len());
//! });
//! selection.select(Some(entry), false);
//! ```

use std::collections::{HashMap, HashSet};

use lattice_gallery_core::logging::targets;
use lattice_gallery_core::Signal;
use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// Selection behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one item is selected (default).
    #[default]
    Single,
    /// Any number of items can be selected.
    Multi,
}

/// Position of an item: a group index, optionally followed by a child index.
///
/// Ordering is lexicographic with the group itself first, i.e.
/// `group(1) < child(1, 0) < child(1, 9) < group(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemPath {
    pub group: usize,
    pub child: Option<usize>,
}

impl ItemPath {
    pub const fn group(group: usize) -> Self {
        Self { group, child: None }
    }

    pub const fn child(group: usize, index: usize) -> Self {
        Self {
            group,
            child: Some(index),
        }
    }

    pub fn is_group(&self) -> bool {
        self.child.is_none()
    }
}

/// An item to select, with its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEntry {
    pub id: ItemId,
    pub path: ItemPath,
    /// Owning group for children, `None` for top-level groups.
    pub parent: Option<ItemId>,
}

/// Resolves positions to items while walking a range.
pub trait SelectionSource {
    /// Id of the realized group at `group`.
    fn group_id(&self, group: usize) -> Option<ItemId>;
    /// Reported child count of the group at `group`.
    fn child_count(&self, group: usize) -> usize;
    /// Id of the realized child at `index` of group `group`.
    fn child_id(&self, group: usize, index: usize) -> Option<ItemId>;
}

/// Payload of [`SelectionModel::selection_changed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub selected: Vec<ItemId>,
    pub deselected: Vec<ItemId>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Selected {
    path: ItemPath,
    parent: Option<ItemId>,
}

/// Selection state of a gallery.
///
/// # Signals
///
/// - `selection_changed`: emitted at most once per operation, only when the
///   selection actually changed.
pub struct SelectionModel {
    mode: SelectionMode,

    /// Range anchor (last plain or toggle click).
    anchor: Option<ItemId>,

    /// Selected identities in selection order.
    order: Vec<ItemId>,

    /// Identity lookup with the stored position.
    entries: HashMap<ItemId, Selected>,

    /// Selected top-level group indices.
    top_level: Vec<usize>,

    /// Selected child indices, keyed by owning group.
    within_group: HashMap<ItemId, Vec<usize>>,

    /// Emitted when selection changes.
    pub selection_changed: Signal<SelectionChange>,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl SelectionModel {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            anchor: None,
            order: Vec::new(),
            entries: HashMap::new(),
            top_level: Vec::new(),
            within_group: HashMap::new(),
            selection_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Mode and anchor
    // =========================================================================

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Sets the selection mode. Existing selection is kept.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn anchor(&self) -> Option<ItemId> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<ItemId>) {
        self.anchor = anchor;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn has_selection(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.order.len()
    }

    /// Selected items in selection order.
    pub fn selected_items(&self) -> &[ItemId] {
        &self.order
    }

    /// Selected top-level group indices, in selection order.
    pub fn top_level_indices(&self) -> &[usize] {
        &self.top_level
    }

    /// Selected child indices of `group`, in selection order.
    pub fn indices_in_group(&self, group: ItemId) -> &[usize] {
        self.within_group.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stored position of a selected item.
    pub fn path_of(&self, id: ItemId) -> Option<ItemPath> {
        self.entries.get(&id).map(|selected| selected.path)
    }

    // =========================================================================
    // Selection operations
    // =========================================================================

    /// Select `entry`.
    ///
    /// Without `additive` (or in single mode) everything else is deselected.
    /// An absent entry is a no-op.
    pub fn select(&mut self, entry: Option<SelectionEntry>, additive: bool) {
        let Some(entry) = entry else { return };
        let mut change = SelectionChange::default();
        if !additive || self.mode == SelectionMode::Single {
            change.deselected = self.remove_all_except(Some(entry.id));
        }
        if self.add(entry) {
            change.selected.push(entry.id);
        }
        self.notify(change);
    }

    /// Flip the selection state of `entry`.
    pub fn toggle(&mut self, entry: Option<SelectionEntry>) {
        let Some(entry) = entry else { return };
        if self.is_selected(entry.id) {
            self.deselect(entry.id);
        } else {
            self.select(Some(entry), true);
        }
    }

    /// Remove one item from the selection.
    pub fn deselect(&mut self, id: ItemId) {
        if self.remove(id) {
            self.notify(SelectionChange {
                selected: Vec::new(),
                deselected: vec![id],
            });
        }
    }

    /// Select every item between `a` and `b` inclusive, in path order.
    ///
    /// Both endpoints groups: selects the groups in between. Otherwise the
    /// children in between are selected: tail of the first group, every child
    /// of the groups in between and head of the last group. The result does
    /// not depend on the order of `a` and `b`. In single mode only `b` is
    /// selected.
    pub fn select_range(
        &mut self,
        a: ItemPath,
        b: ItemPath,
        source: &dyn SelectionSource,
        additive: bool,
    ) {
        if self.mode == SelectionMode::Single {
            let entry = entry_at(b, source);
            self.select(entry, false);
            return;
        }

        let range = range_entries(a.min(b), a.max(b), source);
        let mut change = SelectionChange::default();
        if !additive {
            let keep: HashSet<ItemId> = range.iter().map(|entry| entry.id).collect();
            let stale: Vec<ItemId> = self
                .order
                .iter()
                .copied()
                .filter(|id| !keep.contains(id))
                .collect();
            for id in stale {
                if self.remove(id) {
                    change.deselected.push(id);
                }
            }
        }
        for entry in range {
            if self.add(entry) {
                change.selected.push(entry.id);
            }
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = change.selected.len(),
            deselected = change.deselected.len(),
            "range selection"
        );
        self.notify(change);
    }

    /// Select several entries with a single notification.
    ///
    /// In single mode only the last entry ends up selected.
    pub fn select_many(&mut self, entries: impl IntoIterator<Item = SelectionEntry>) {
        if self.mode == SelectionMode::Single {
            let last = entries.into_iter().last();
            self.select(last, true);
            return;
        }
        let mut change = SelectionChange::default();
        for entry in entries {
            if self.add(entry) {
                change.selected.push(entry.id);
            }
        }
        self.notify(change);
    }

    /// Make `entries` the whole selection with a single notification.
    ///
    /// Items already selected and listed stay selected without being
    /// reported. In single mode only the last entry is kept.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = SelectionEntry>) {
        let mut entries: Vec<SelectionEntry> = entries.into_iter().collect();
        if self.mode == SelectionMode::Single && entries.len() > 1 {
            entries.drain(..entries.len() - 1);
        }
        let keep: HashSet<ItemId> = entries.iter().map(|entry| entry.id).collect();
        let stale: Vec<ItemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !keep.contains(id))
            .collect();
        let mut change = SelectionChange::default();
        for id in stale {
            if self.remove(id) {
                change.deselected.push(id);
            }
        }
        for entry in entries {
            if self.add(entry) {
                change.selected.push(entry.id);
            }
        }
        self.notify(change);
    }

    /// Clear the selection, emitting `selection_changed` only when `notify`.
    pub fn deselect_all(&mut self, notify: bool) {
        let deselected = self.remove_all_except(None);
        if notify {
            self.notify(SelectionChange {
                selected: Vec::new(),
                deselected,
            });
        }
    }

    /// Drop items that left the collection. Emits at most one notification.
    pub fn evict(&mut self, ids: &[ItemId]) {
        let mut deselected = Vec::new();
        for &id in ids {
            if self.anchor == Some(id) {
                self.anchor = None;
            }
            if self.remove(id) {
                deselected.push(id);
            }
        }
        self.notify(SelectionChange {
            selected: Vec::new(),
            deselected,
        });
    }

    // =========================================================================
    // Index maintenance
    // =========================================================================

    /// A top-level group was inserted at `at`.
    pub fn group_inserted(&mut self, at: usize) {
        for selected in self.entries.values_mut() {
            if selected.path.group >= at {
                selected.path.group += 1;
            }
        }
        for index in &mut self.top_level {
            if *index >= at {
                *index += 1;
            }
        }
    }

    /// The top-level group at `at` was removed. Evict its members first.
    pub fn group_removed(&mut self, at: usize) {
        for selected in self.entries.values_mut() {
            if selected.path.group > at {
                selected.path.group -= 1;
            }
        }
        for index in &mut self.top_level {
            if *index > at {
                *index -= 1;
            }
        }
    }

    /// A child was inserted at `at` inside `group`.
    pub fn child_inserted(&mut self, group: ItemId, at: usize) {
        self.shift_children(group, |index| (index >= at).then(|| index + 1));
    }

    /// The child at `at` inside `group` was removed. Evict it first.
    pub fn child_removed(&mut self, group: ItemId, at: usize) {
        self.shift_children(group, |index| (index > at).then(|| index - 1));
    }

    fn shift_children(&mut self, group: ItemId, shift: impl Fn(usize) -> Option<usize>) {
        for selected in self.entries.values_mut() {
            if selected.parent != Some(group) {
                continue;
            }
            if let Some(shifted) = selected.path.child.and_then(&shift) {
                selected.path.child = Some(shifted);
            }
        }
        if let Some(indices) = self.within_group.get_mut(&group) {
            for index in indices.iter_mut() {
                if let Some(shifted) = shift(*index) {
                    *index = shifted;
                }
            }
        }
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn add(&mut self, entry: SelectionEntry) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }
        self.order.push(entry.id);
        self.entries.insert(
            entry.id,
            Selected {
                path: entry.path,
                parent: entry.parent,
            },
        );
        match (entry.parent, entry.path.child) {
            (Some(parent), Some(child)) => self.within_group.entry(parent).or_default().push(child),
            _ => self.top_level.push(entry.path.group),
        }
        true
    }

    fn remove(&mut self, id: ItemId) -> bool {
        let Some(selected) = self.entries.remove(&id) else {
            return false;
        };
        self.order.retain(|other| *other != id);
        match (selected.parent, selected.path.child) {
            (Some(parent), Some(child)) => {
                if let Some(indices) = self.within_group.get_mut(&parent) {
                    indices.retain(|index| *index != child);
                    if indices.is_empty() {
                        self.within_group.remove(&parent);
                    }
                }
            }
            _ => self.top_level.retain(|index| *index != selected.path.group),
        }
        true
    }

    fn remove_all_except(&mut self, keep: Option<ItemId>) -> Vec<ItemId> {
        let others: Vec<ItemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| Some(*id) != keep)
            .collect();
        others.into_iter().filter(|id| self.remove(*id)).collect()
    }

    fn notify(&self, change: SelectionChange) {
        if change.is_empty() {
            return;
        }
        tracing::trace!(
            target: targets::SELECTION,
            selected = change.selected.len(),
            deselected = change.deselected.len(),
            total = self.order.len(),
            "selection changed"
        );
        self.selection_changed.emit(change);
    }
}

fn entry_at(path: ItemPath, source: &dyn SelectionSource) -> Option<SelectionEntry> {
    let group_id = source.group_id(path.group)?;
    match path.child {
        None => Some(SelectionEntry {
            id: group_id,
            path,
            parent: None,
        }),
        Some(index) => source.child_id(path.group, index).map(|id| SelectionEntry {
            id,
            path,
            parent: Some(group_id),
        }),
    }
}

fn range_entries(lo: ItemPath, hi: ItemPath, source: &dyn SelectionSource) -> Vec<SelectionEntry> {
    if lo.is_group() && hi.is_group() {
        return (lo.group..=hi.group)
            .filter_map(|group| entry_at(ItemPath::group(group), source))
            .collect();
    }

    let start = lo.child.unwrap_or(0);
    let mut entries = Vec::new();
    for group in lo.group..=hi.group {
        let count = source.child_count(group);
        if count == 0 {
            continue;
        }
        let from = if group == lo.group { start } else { 0 };
        let to = match (group == hi.group, hi.child) {
            (true, Some(end)) => end.min(count - 1),
            // a group sorts before its own children
            (true, None) => continue,
            (false, _) => count - 1,
        };
        if from > to {
            continue;
        }
        entries.extend((from..=to).filter_map(|index| entry_at(ItemPath::child(group, index), source)));
    }
    entries
}
