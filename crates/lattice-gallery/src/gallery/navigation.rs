//! Keyboard navigation between items.

use crate::item::ItemId;
use crate::layout::Orientation;
use crate::selection::ItemPath;

use super::Gallery;

/// Navigation keys understood by [`Gallery::next_item`].
///
/// Directions are physical. In a horizontal gallery, where lines of items run
/// down the cross axis, Left/Right move between lines and Up/Down within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKey {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

impl NavigationKey {
    /// The key as seen in a vertical layout.
    fn normalized(self, orientation: Orientation) -> Self {
        match (orientation, self) {
            (Orientation::Horizontal, NavigationKey::Left) => NavigationKey::Up,
            (Orientation::Horizontal, NavigationKey::Up) => NavigationKey::Left,
            (Orientation::Horizontal, NavigationKey::Right) => NavigationKey::Down,
            (Orientation::Horizontal, NavigationKey::Down) => NavigationKey::Right,
            (_, key) => key,
        }
    }
}

/// `(group, child)` position of a navigable item.
type Cursor = (usize, usize);

impl Gallery {
    /// Item reached from `current` by pressing `key`, materializing it if
    /// needed. `None` when there is nowhere to go.
    ///
    /// Only children of expanded, non-empty groups are visited. Vertical
    /// moves keep the column, clamped to the length of the target line.
    pub fn next_item(&mut self, current: Option<ItemId>, key: NavigationKey) -> Option<ItemId> {
        let key = key.normalized(self.config.orientation);
        let target = match current.and_then(|id| self.tree.path_of(id)) {
            None => self.first_cursor(),
            Some(ItemPath { group, child: None }) => self.step_from_group(group, key),
            Some(ItemPath {
                group,
                child: Some(index),
            }) => self.step(group, index, key),
        }?;
        self.resolve(target)
    }

    fn step(&self, group: usize, index: usize, key: NavigationKey) -> Option<Cursor> {
        match key {
            NavigationKey::Home => self.first_cursor(),
            NavigationKey::End => self.last_cursor(),
            NavigationKey::PageUp | NavigationKey::PageDown => {
                let line_key = if key == NavigationKey::PageUp {
                    NavigationKey::Up
                } else {
                    NavigationKey::Down
                };
                let lines = self.layout.lines_per_page(self.viewport.viewport_extent());
                let mut cursor = None;
                let mut at = (group, index);
                for _ in 0..lines.saturating_sub(1).max(1) {
                    match self.step(at.0, at.1, line_key) {
                        Some(next) => {
                            cursor = Some(next);
                            at = next;
                        }
                        None => break,
                    }
                }
                cursor
            }
            _ => self.step_line(group, index, key),
        }
    }

    fn step_line(&self, group: usize, index: usize, key: NavigationKey) -> Option<Cursor> {
        let columns = self.layout.columns().max(1);
        let len = self.navigable_len(group)?;
        let column = index % columns;
        match key {
            NavigationKey::Left if index > 0 => Some((group, index - 1)),
            NavigationKey::Left => self.last_before(group),
            NavigationKey::Right if index + 1 < len => Some((group, index + 1)),
            NavigationKey::Right => self.first_after(group),
            NavigationKey::Up if index >= columns => Some((group, index - columns)),
            NavigationKey::Up => {
                let (previous, _) = self.last_before(group)?;
                let previous_len = self.navigable_len(previous)?;
                let last_line = (previous_len - 1) / columns * columns;
                Some((previous, (last_line + column).min(previous_len - 1)))
            }
            NavigationKey::Down if index + columns < len => Some((group, index + columns)),
            // partial last line below
            NavigationKey::Down if index / columns < (len - 1) / columns => Some((group, len - 1)),
            NavigationKey::Down => {
                let (next, _) = self.first_after(group)?;
                let next_len = self.navigable_len(next)?;
                Some((next, column.min(next_len - 1)))
            }
            _ => None,
        }
    }

    fn step_from_group(&self, group: usize, key: NavigationKey) -> Option<Cursor> {
        match key {
            NavigationKey::Home => self.first_cursor(),
            NavigationKey::End => self.last_cursor(),
            NavigationKey::Left | NavigationKey::Up | NavigationKey::PageUp => self.last_before(group),
            _ => match self.navigable_len(group) {
                Some(_) => Some((group, 0)),
                None => self.first_after(group),
            },
        }
    }

    /// Child count of `group` if its children can be navigated.
    fn navigable_len(&self, group: usize) -> Option<usize> {
        let geometry = self.layout.geometry(group)?;
        (geometry.expanded && geometry.len > 0).then_some(geometry.len)
    }

    fn first_cursor(&self) -> Option<Cursor> {
        self.first_after_or_at(0)
    }

    fn last_cursor(&self) -> Option<Cursor> {
        self.last_before(self.layout.group_count())
    }

    fn first_after(&self, group: usize) -> Option<Cursor> {
        self.first_after_or_at(group + 1)
    }

    fn first_after_or_at(&self, group: usize) -> Option<Cursor> {
        (group..self.layout.group_count()).find_map(|next| self.navigable_len(next).map(|_| (next, 0)))
    }

    fn last_before(&self, group: usize) -> Option<Cursor> {
        (0..group)
            .rev()
            .find_map(|previous| self.navigable_len(previous).map(|len| (previous, len - 1)))
    }

    /// Materialize the item at `cursor`. A group whose realized length is
    /// shorter than its laid out length clamps to its last child.
    fn resolve(&mut self, (group, index): Cursor) -> Option<ItemId> {
        let group = self.get_item(group, true)?;
        self.ensure_concrete(group);
        let len = self.child_count(group)?;
        if len == 0 {
            return None;
        }
        self.get_child(group, index.min(len - 1), true)
    }
}
