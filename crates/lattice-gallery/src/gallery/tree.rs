//! Item arena and top-level slots.

use slotmap::SlotMap;

use crate::collection::IndexedCollection;
use crate::error::{GalleryError, Result};
use crate::group::VirtualGroup;
use crate::item::{ItemContent, ItemId};
use crate::layout::LayoutSource;
use crate::selection::{ItemPath, SelectionEntry, SelectionSource};

pub(super) struct Node {
    pub(super) parent: Option<ItemId>,
    pub(super) content: ItemContent,
    /// Present on top-level groups only.
    pub(super) group: Option<VirtualGroup>,
}

impl Node {
    pub(super) fn group(content: ItemContent, group: VirtualGroup) -> Self {
        Self {
            parent: None,
            content,
            group: Some(group),
        }
    }

    pub(super) fn child(parent: ItemId, content: ItemContent) -> Self {
        Self {
            parent: Some(parent),
            content,
            group: None,
        }
    }
}

pub(super) struct ItemTree {
    pub(super) nodes: SlotMap<ItemId, Node>,
    pub(super) roots: IndexedCollection<ItemId>,
    /// Child count assumed for top-level slots that are not realized yet.
    pub(super) default_item_count: usize,
}

impl ItemTree {
    pub(super) fn new(default_item_count: usize) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: IndexedCollection::new(),
            default_item_count,
        }
    }

    pub(super) fn group(&self, id: ItemId) -> Result<&VirtualGroup> {
        let node = self.nodes.get(id).ok_or(GalleryError::NullArgument)?;
        node.group.as_ref().ok_or(GalleryError::NotAGroup)
    }

    pub(super) fn group_mut(&mut self, id: ItemId) -> Result<&mut VirtualGroup> {
        let node = self.nodes.get_mut(id).ok_or(GalleryError::NullArgument)?;
        node.group.as_mut().ok_or(GalleryError::NotAGroup)
    }

    /// Realized group at top-level position `index`.
    pub(super) fn group_at(&self, index: usize) -> Option<(ItemId, &VirtualGroup)> {
        let id = self.roots.key_at(index)?;
        let group = self.nodes.get(id)?.group.as_ref()?;
        Some((id, group))
    }

    /// Top-level position of the group owning `id` (or of `id` itself).
    pub(super) fn group_index_of(&self, id: ItemId) -> Option<usize> {
        let node = self.nodes.get(id)?;
        self.roots.index_of(node.parent.unwrap_or(id))
    }

    pub(super) fn path_of(&self, id: ItemId) -> Option<ItemPath> {
        let node = self.nodes.get(id)?;
        match node.parent {
            None => self.roots.index_of(id).map(ItemPath::group),
            Some(parent) => {
                let group = self.roots.index_of(parent)?;
                let index = self.group(parent).ok()?.children().index_of(id)?;
                Some(ItemPath::child(group, index))
            }
        }
    }

    pub(super) fn entry(&self, id: ItemId) -> Option<SelectionEntry> {
        let path = self.path_of(id)?;
        let parent = self.nodes.get(id)?.parent;
        Some(SelectionEntry { id, path, parent })
    }

    /// `id` followed by its realized children.
    pub(super) fn subtree(&self, id: ItemId) -> Vec<ItemId> {
        let mut ids = vec![id];
        if let Ok(group) = self.group(id) {
            ids.extend(group.children().realized().map(|(_, child)| child));
        }
        ids
    }

    /// Subtrees of several top-level ids.
    pub(super) fn subtrees(&self, roots: &[ItemId]) -> Vec<ItemId> {
        roots.iter().flat_map(|&id| self.subtree(id)).collect()
    }

    pub(super) fn dispose(&mut self, ids: &[ItemId]) {
        for &id in ids {
            self.nodes.remove(id);
        }
    }
}

impl LayoutSource for ItemTree {
    fn group_count(&self) -> usize {
        self.roots.len()
    }

    fn group_len(&self, group: usize) -> usize {
        self.group_at(group)
            .map_or(self.default_item_count, |(_, group)| group.child_count())
    }

    fn group_expanded(&self, group: usize) -> bool {
        self.group_at(group).is_none_or(|(_, group)| group.is_expanded())
    }

    fn group_header(&self, group: usize) -> Option<&ItemContent> {
        let id = self.roots.key_at(group)?;
        self.nodes.get(id).map(|node| &node.content)
    }

    fn child_content(&self, group: usize, index: usize) -> Option<&ItemContent> {
        let (_, group) = self.group_at(group)?;
        let child = group.children().key_at(index)?;
        self.nodes.get(child).map(|node| &node.content)
    }
}

impl SelectionSource for ItemTree {
    fn group_id(&self, group: usize) -> Option<ItemId> {
        self.roots.key_at(group)
    }

    fn child_count(&self, group: usize) -> usize {
        self.group_at(group).map_or(0, |(_, group)| group.children().len())
    }

    fn child_id(&self, group: usize, index: usize) -> Option<ItemId> {
        self.group_at(group)?.1.children().key_at(index)
    }
}
