//! Group nodes and lazy ("dummy") groups.

use crate::collection::{IndexedCollection, Slot};
use crate::item::ItemId;

/// Child storage of a group.
///
/// A group created for a virtual slot starts as a dummy: it reports a
/// placeholder child count and owns no child slots until [`realize`] runs.
///
/// [`realize`]: VirtualGroup::realize
#[derive(Debug, Clone)]
pub struct VirtualGroup {
    children: IndexedCollection<ItemId>,
    placeholder: Option<usize>,
    expanded: bool,
}

impl Default for VirtualGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualGroup {
    /// A concrete, empty, expanded group.
    pub fn new() -> Self {
        Self {
            children: IndexedCollection::new(),
            placeholder: None,
            expanded: true,
        }
    }

    /// A dummy group reporting `count` unrealized children.
    pub fn dummy(count: usize) -> Self {
        let mut group = Self::new();
        group.set_virtual_child_count(count);
        group
    }

    /// Put the group into the dummy state with `count` placeholder children.
    ///
    /// Returns any realized children that were dropped.
    pub fn set_virtual_child_count(&mut self, count: usize) -> Vec<ItemId> {
        let dropped = self.children.clear();
        self.placeholder = Some(count);
        dropped
    }

    pub fn is_dummy(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Reported child count: the placeholder while dummy, the slot count after.
    pub fn child_count(&self) -> usize {
        self.placeholder.unwrap_or_else(|| self.children.len())
    }

    /// Replace the placeholder with `count` concrete, unrealized child slots.
    ///
    /// Returns the previously reported count and any realized children that
    /// fell off the end (only possible on an already concrete group).
    pub fn realize(&mut self, count: usize) -> (usize, Vec<ItemId>) {
        let previous = self.child_count();
        self.placeholder = None;
        let dropped = self.children.set_count(count);
        (previous, dropped)
    }

    /// Concrete child slots. Empty while the group is a dummy.
    pub fn children(&self) -> &IndexedCollection<ItemId> {
        &self.children
    }

    /// Mutable child slots; a dummy is made concrete first, keeping its
    /// placeholder count as unrealized slots.
    pub fn children_mut(&mut self) -> &mut IndexedCollection<ItemId> {
        if let Some(count) = self.placeholder.take() {
            self.children.set_count(count);
        }
        &mut self.children
    }

    /// Resize the concrete child list, returning dropped children.
    pub fn set_child_count(&mut self, count: usize) -> Vec<ItemId> {
        self.placeholder = None;
        self.children.set_count(count)
    }

    /// Slot of child `index`. Dummy children are always unrealized.
    pub fn child(&self, index: usize) -> Option<Slot<ItemId>> {
        match self.placeholder {
            Some(count) if index < count => Some(Slot::Unrealized),
            Some(_) => None,
            None => self.children.get(index),
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns `true` if the flag changed.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        let changed = self.expanded != expanded;
        self.expanded = expanded;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_dummy_reports_placeholder() {
        let group = VirtualGroup::dummy(10);
        assert!(group.is_dummy());
        assert_eq!(group.child_count(), 10);
        assert_eq!(group.child(9), Some(Slot::Unrealized));
        assert_eq!(group.child(10), None);
        assert!(group.children().is_empty());
    }

    #[test]
    fn test_realize_replaces_placeholder() {
        let mut group = VirtualGroup::dummy(10);
        let (previous, dropped) = group.realize(3);
        assert_eq!(previous, 10);
        assert!(dropped.is_empty());
        assert!(!group.is_dummy());
        assert_eq!(group.child_count(), 3);
        assert_eq!(group.children().len(), 3);
    }

    #[test]
    fn test_children_mut_materializes_placeholder() {
        let mut ids: SlotMap<ItemId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let mut group = VirtualGroup::dummy(2);
        group.children_mut().insert(id, Some(0)).unwrap();
        assert!(!group.is_dummy());
        assert_eq!(group.child_count(), 3);
        assert_eq!(group.child(0), Some(Slot::Realized(id)));
    }

    #[test]
    fn test_expanded_flag() {
        let mut group = VirtualGroup::new();
        assert!(group.is_expanded());
        assert!(group.set_expanded(false));
        assert!(!group.set_expanded(false));
    }
}
