//! Gallery configuration.
//!
//! [`GalleryConfig`] replaces renderer-wide defaults: every gallery receives
//! its own configuration at construction. Configurations are plain serde
//! structs, so they can be embedded in application settings or loaded from a
//! TOML file:
//!
//! ```toml
//! orientation = "vertical"
//! selection_mode = "multi"
//! virtual_mode = true
//! virtual_groups = true
//!
//! [layout]
//! strategy = "grid"
//! item_width = 96
//! item_height = 96
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::item::ResolvedStyle;
use crate::layout::Orientation;
use crate::selection::SelectionMode;

/// Which layout strategy lays out the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Fixed-size cells wrapped into lines (default).
    #[default]
    Grid,
    /// One row per item, row extent driven by content.
    List,
}

/// Layout parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub strategy: StrategyKind,
    /// Grid cell width in pixels.
    pub item_width: i32,
    /// Grid cell height in pixels.
    pub item_height: i32,
    /// Minimum spacing between cells and around the content.
    pub min_margin: i32,
    /// Spread the spare cross-axis space evenly between grid cells.
    pub auto_margin: bool,
    /// Lay out every group as expanded, whatever its flag says.
    pub always_expanded: bool,
    /// Reserve space for group headers.
    pub group_headers: bool,
    /// Minimum row extent of the list strategy.
    pub list_row_extent: i32,
    /// Gap after every list row.
    pub list_spacing: i32,
    /// Line height used to measure text when an item has no font override.
    pub header_font_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Grid,
            item_width: 72,
            item_height: 56,
            min_margin: 2,
            auto_margin: true,
            always_expanded: false,
            group_headers: true,
            list_row_extent: 24,
            list_spacing: 2,
            header_font_height: 12,
        }
    }
}

/// Construction-time configuration of a [`Gallery`](crate::Gallery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub orientation: Orientation,
    pub selection_mode: SelectionMode,
    /// Unrealized top-level slots are realized when a paint pass reaches them.
    pub virtual_mode: bool,
    /// Materialized top-level slots start as dummy groups and fetch their
    /// content on first paint.
    pub virtual_groups: bool,
    /// Child count reported by a group before its content is fetched.
    pub virtual_group_default_item_count: usize,
    /// Realizing a group also realizes every group before it.
    pub compatibility_mode: bool,
    /// Keep the viewport centered on the same content across resizes.
    pub keep_location_on_resize: bool,
    /// Maximum number of realization requests handed out per batch.
    pub realization_batch_size: usize,
    pub layout: LayoutConfig,
    /// Collection-level style defaults.
    pub style: ResolvedStyle,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            selection_mode: SelectionMode::Single,
            virtual_mode: false,
            virtual_groups: false,
            virtual_group_default_item_count: 10,
            compatibility_mode: false,
            keep_location_on_resize: true,
            realization_batch_size: 10,
            layout: LayoutConfig::default(),
            style: ResolvedStyle::default(),
        }
    }
}

impl GalleryConfig {
    /// Configuration for a virtual gallery with lazily fetched groups.
    pub fn virtual_groups() -> Self {
        Self {
            virtual_mode: true,
            virtual_groups: true,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GalleryConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Serialize to a pretty TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the layout engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let checks: [(bool, &'static str, &'static str); 7] = [
            (layout.item_width > 0, "layout.item_width", "must be positive"),
            (layout.item_height > 0, "layout.item_height", "must be positive"),
            (layout.min_margin >= 0, "layout.min_margin", "must not be negative"),
            (layout.list_row_extent > 0, "layout.list_row_extent", "must be positive"),
            (layout.list_spacing >= 0, "layout.list_spacing", "must not be negative"),
            (layout.header_font_height > 0, "layout.header_font_height", "must be positive"),
            (self.realization_batch_size > 0, "realization_batch_size", "must be positive"),
        ];
        match checks.into_iter().find(|(ok, _, _)| !ok) {
            Some((_, field, reason)) => Err(ConfigError::Invalid { field, reason }),
            None => Ok(()),
        }
    }
}
