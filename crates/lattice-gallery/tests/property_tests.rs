//! Property tests for collection bookkeeping, selection and layout.

use lattice_gallery::{
    FixedMetrics, Gallery, GalleryConfig, GroupData, GroupGeometry, IndexedCollection, ItemContent, ItemId,
    ProviderError, Rect, SelectionMode, StrategyKind, ViewportController,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum SlotOp {
    Insert(usize),
    Remove(usize),
}

fn slot_op() -> impl Strategy<Value = SlotOp> {
    prop_oneof![
        (0usize..100).prop_map(SlotOp::Insert),
        (0usize..100).prop_map(SlotOp::Remove),
    ]
}

#[derive(Debug, Clone)]
enum TreeOp {
    AddGroup,
    AddItem(usize),
    RemoveItem(usize),
    Collapse(usize),
}

fn tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        Just(TreeOp::AddGroup),
        (0usize..8).prop_map(TreeOp::AddItem),
        (0usize..8).prop_map(TreeOp::RemoveItem),
        (0usize..8).prop_map(TreeOp::Collapse),
    ]
}

/// Extent of a grid group at 4 columns: header 19, 58 per line.
fn expected_extent(len: usize, expanded: bool) -> i64 {
    if expanded && len > 0 {
        19 + len.div_ceil(4) as i64 * 58
    } else {
        19
    }
}

/// What the provider answers for one group.
#[derive(Debug, Clone)]
enum Fetch {
    Lazy(usize),
    /// Eager children, each with this many extra text lines.
    Eager(Vec<usize>),
    Fail,
}

fn fetch() -> impl Strategy<Value = Fetch> {
    prop_oneof![
        (0usize..30).prop_map(Fetch::Lazy),
        prop::collection::vec(0usize..4, 0..12).prop_map(Fetch::Eager),
        Just(Fetch::Fail),
    ]
}

fn group_data(fetch: &Fetch, index: usize) -> Result<GroupData, ProviderError> {
    let mut header = ItemContent::titled(format!("group {index}"));
    if index % 2 == 1 {
        header = header.with_text(1, "subtitle");
    }
    match fetch {
        Fetch::Lazy(count) => Ok(GroupData::lazy(header, *count)),
        Fetch::Eager(extra) => {
            let children = extra
                .iter()
                .map(|&lines| (1..=lines).fold(ItemContent::titled("item"), |item, slot| item.with_text(slot, "line")))
                .collect();
            Ok(GroupData::eager(header, children))
        }
        Fetch::Fail => Err(ProviderError::MissingGroup { group: index }),
    }
}

/// Geometry of every group plus the content extent.
fn layout_snapshot(gallery: &Gallery) -> (Vec<Option<GroupGeometry>>, i64) {
    let layout = gallery.layout();
    let geometry = (0..layout.group_count()).map(|group| layout.geometry(group).cloned()).collect();
    (geometry, gallery.content_extent())
}

fn gallery_with(counts: &[usize]) -> (Gallery, Vec<ItemId>) {
    let mut gallery = Gallery::new(GalleryConfig {
        selection_mode: SelectionMode::Multi,
        ..GalleryConfig::default()
    });
    gallery.set_viewport_size(300, 200);
    let mut ids = Vec::new();
    for &count in counts {
        let group = gallery.add_group(ItemContent::default(), None).unwrap();
        ids.push(group);
        for _ in 0..count {
            ids.push(gallery.add_item(group, ItemContent::default(), None).unwrap());
        }
    }
    (gallery, ids)
}

proptest! {
    #[test]
    fn index_of_matches_positions(ops in prop::collection::vec(slot_op(), 1..80)) {
        let mut collection = IndexedCollection::new();
        let mut model: Vec<u32> = Vec::new();
        let mut next_key = 0u32;

        for op in ops {
            match op {
                SlotOp::Insert(seed) => {
                    let position = seed % (model.len() + 1);
                    collection.insert(next_key, Some(position)).unwrap();
                    model.insert(position, next_key);
                    next_key += 1;
                }
                SlotOp::Remove(seed) if !model.is_empty() => {
                    let position = seed % model.len();
                    let removed = collection.remove_at(position).unwrap();
                    prop_assert_eq!(removed, Some(model.remove(position)));
                }
                SlotOp::Remove(_) => {}
            }
            prop_assert_eq!(collection.len(), model.len());
            for (position, key) in model.iter().enumerate() {
                prop_assert_eq!(collection.index_of(*key), Some(position));
            }
        }
    }

    #[test]
    fn range_selection_is_symmetric(
        counts in prop::collection::vec(0usize..6, 1..5),
        a in 0usize..100,
        b in 0usize..100,
    ) {
        let (mut forward, ids) = gallery_with(&counts);
        let (mut backward, _) = gallery_with(&counts);
        // ids are allocated identically in both galleries
        let (a, b) = (ids[a % ids.len()], ids[b % ids.len()]);

        forward.select_range(a, b, false);
        backward.select_range(b, a, false);

        let mut left = forward.selected_items().to_vec();
        let mut right = backward.selected_items().to_vec();
        left.sort();
        right.sort();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn incremental_layout_matches_full(ops in prop::collection::vec(tree_op(), 1..60)) {
        let (mut gallery, _) = gallery_with(&[]);
        let mut groups: Vec<(ItemId, Vec<ItemId>, bool)> = Vec::new();

        for op in ops {
            match op {
                TreeOp::AddGroup => {
                    let id = gallery.add_group(ItemContent::default(), None).unwrap();
                    groups.push((id, Vec::new(), true));
                }
                TreeOp::AddItem(seed) if !groups.is_empty() => {
                    let index = seed % groups.len();
                    let item = gallery.add_item(groups[index].0, ItemContent::default(), Some(0)).unwrap();
                    groups[index].1.insert(0, item);
                }
                TreeOp::RemoveItem(seed) if !groups.is_empty() => {
                    let index = seed % groups.len();
                    if let Some(item) = groups[index].1.pop() {
                        gallery.remove(item).unwrap();
                    }
                }
                TreeOp::Collapse(seed) if !groups.is_empty() => {
                    let index = seed % groups.len();
                    let expanded = !groups[index].2;
                    gallery.set_expanded(groups[index].0, expanded).unwrap();
                    groups[index].2 = expanded;
                }
                _ => {}
            }
            let expected: i64 = groups
                .iter()
                .map(|(_, children, expanded)| expected_extent(children.len(), *expanded))
                .sum();
            prop_assert_eq!(gallery.content_extent(), expected);
            prop_assert!(gallery.translation() >= 0);
        }
    }

    #[test]
    fn validate_is_idempotent(
        content in 0i64..10_000,
        viewport in 0i32..2_000,
        translation in -5_000i64..15_000,
    ) {
        let mut controller = ViewportController::new();
        controller.set_viewport_size(viewport, 300);
        controller.set_content_extent(content);
        controller.set_translation(translation);

        let once = controller.translation();
        prop_assert!(once >= 0);
        prop_assert!(once <= (content - i64::from(viewport)).max(0));
        controller.validate();
        prop_assert_eq!(controller.translation(), once);
    }

    #[test]
    fn realized_layout_matches_full(
        list in any::<bool>(),
        fetches in prop::collection::vec(fetch(), 1..40),
        scrolls in prop::collection::vec(0i64..20_000, 1..6),
    ) {
        let mut config = GalleryConfig::virtual_groups();
        config.layout.strategy = if list { StrategyKind::List } else { StrategyKind::Grid };
        let mut gallery = Gallery::new(config);
        gallery.set_viewport_size(300, 200);
        gallery.set_count(fetches.len());

        for translation in scrolls {
            gallery.scroll_to(translation);
            gallery.prepare_paint(Rect::new(0, 0, 300, 200));
            loop {
                let batch = gallery.pending_realizations();
                if batch.is_empty() {
                    break;
                }
                for ticket in batch {
                    let result = group_data(&fetches[ticket.group_index], ticket.group_index);
                    prop_assert!(gallery.apply_realization(ticket, result).is_ok());
                }
            }

            let incremental = layout_snapshot(&gallery);
            // replacing the metrics forces a full recompute
            gallery.set_metrics(Box::new(FixedMetrics { font_height: 12 }));
            prop_assert_eq!(layout_snapshot(&gallery), incremental);
        }
    }
}
