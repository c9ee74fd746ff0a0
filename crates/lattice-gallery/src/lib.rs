//! Lattice Gallery - a virtualized two-level collection of groups and items.
//!
//! A [`Gallery`] holds top-level groups, each owning a list of child items.
//! It is built to show very large collections:
//!
//! - **Virtual slots**: the top-level count can be set without creating any
//!   group; groups are materialized when a paint pass or a lookup reaches them
//! - **Lazy groups**: a materialized group may start as a dummy that reports a
//!   placeholder child count until its content is fetched from a
//!   [`ContentProvider`]
//! - **Incremental layout**: only the group that changed is re-measured, the
//!   groups after it are shifted
//! - **Selection**: single or multi selection across group boundaries, kept in
//!   sync with insertions and removals
//!
//! Rendering is left to the caller: [`Gallery::prepare_paint`] reports which
//! groups and children intersect a clip rectangle and where they are.
//!
//! # Example
//!
//! ```
//! use lattice_gallery::{Gallery, GalleryConfig, ItemContent, Rect};
//!
//! let mut gallery = Gallery::new(GalleryConfig::default());
//! gallery.set_viewport_size(300, 200);
//!
//! let group = gallery.add_group(ItemContent::titled("Holidays"), None).unwrap();
//! for name in ["beach", "hike", "sunset"] {
//!     gallery.add_item(group, ItemContent::titled(name), None).unwrap();
//! }
//!
//! let visible = gallery.prepare_paint(Rect::new(0, 0, 300, 200));
//! assert_eq!(visible[0].children, 0..3);
//! ```

pub mod collection;
pub mod config;
mod error;
mod gallery;
pub mod group;
pub mod item;
pub mod layout;
pub mod prelude;
pub mod provider;
pub mod realize;
pub mod selection;
pub mod viewport;

pub use collection::{IndexedCollection, Slot};
pub use config::{GalleryConfig, LayoutConfig, StrategyKind};
pub use error::{ConfigError, GalleryError, ProviderError, Result};
pub use gallery::{ClickModifiers, Gallery, GallerySignals, NavigationKey, VisibleGroup};
pub use group::VirtualGroup;
pub use item::{
    Color, Corner, Decorations, FontSpec, ImageSize, ItemContent, ItemId, ItemStyle, MaterializationState,
    ResolvedStyle,
};
pub use layout::{
    AxisRect, FixedMetrics, GroupGeometry, LayoutEngine, LayoutStrategy, Orientation, Rect, RenderMetrics,
};
pub use provider::{ContentProvider, GroupChildren, GroupData};
pub use realize::{RealizationOutcome, RealizationQueue, RealizationTicket, TicketId};
pub use selection::{ItemPath, SelectionChange, SelectionEntry, SelectionMode, SelectionModel};
pub use viewport::ViewportController;

pub use lattice_gallery_core::{ConnectionGuard, ConnectionId, Signal};
