//! Content provider interface.
//!
//! A virtual gallery does not own its content up front. When a group or item
//! is first needed the gallery asks its [`ContentProvider`]: groups come back
//! as a header plus either the full child list or just a child count, in
//! which case each child is fetched on demand.

use crate::error::ProviderError;
use crate::item::ItemContent;

/// Children of a fetched group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChildren {
    /// Only the count is known; children are fetched individually.
    Lazy(usize),
    /// Every child's content.
    Eager(Vec<ItemContent>),
}

impl GroupChildren {
    /// Child count of the group.
    pub fn len(&self) -> usize {
        match self {
            GroupChildren::Lazy(count) => *count,
            GroupChildren::Eager(children) => children.len(),
        }
    }

    /// The group has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fetched group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupData {
    pub header: ItemContent,
    pub children: GroupChildren,
}

impl GroupData {
    /// Header plus a child count; children are fetched one at a time.
    pub fn lazy(header: ItemContent, count: usize) -> Self {
        Self {
            header,
            children: GroupChildren::Lazy(count),
        }
    }

    /// Header plus the content of every child.
    pub fn eager(header: ItemContent, children: Vec<ItemContent>) -> Self {
        Self {
            header,
            children: GroupChildren::Eager(children),
        }
    }

    /// A realized group with no children, used when fetching fails.
    pub fn empty() -> Self {
        Self::lazy(ItemContent::default(), 0)
    }
}

/// Supplies content for unrealized groups and items.
pub trait ContentProvider {
    /// Content of the top-level group at `group_index`.
    fn fetch_group(&mut self, group_index: usize) -> Result<GroupData, ProviderError>;

    /// Content of child `item_index` of the group at `group_index`.
    fn fetch_item(&mut self, group_index: usize, item_index: usize) -> Result<ItemContent, ProviderError>;
}
