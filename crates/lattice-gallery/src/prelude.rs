//! Prelude module for Lattice Gallery.
//!
//! ```ignore
//! use lattice_gallery::prelude::*;
//! ```
//!
//! This provides access to:
//! - The gallery facade and its configuration
//! - Item content and identities
//! - Content providers for virtual galleries
//! - Selection and geometry types

// ============================================================================
// Gallery
// ============================================================================

pub use crate::{ClickModifiers, Gallery, GallerySignals, NavigationKey, VisibleGroup};
pub use crate::{GalleryConfig, LayoutConfig, StrategyKind};
pub use crate::{GalleryError, Result};

// ============================================================================
// Content
// ============================================================================

pub use crate::{ItemContent, ItemId, ItemStyle, MaterializationState};
pub use crate::{ContentProvider, GroupData, ProviderError};

// ============================================================================
// Selection and Geometry
// ============================================================================

pub use crate::{ItemPath, SelectionChange, SelectionMode};
pub use crate::{Orientation, Rect};
pub use crate::Signal;
