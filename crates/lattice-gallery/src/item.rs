//! Item content and identity.
//!
//! Every group and every child is an item. Items are plain data: the text
//! slots, an optional image size used for measuring, corner decorations and
//! optional style overrides. Identity is an [`ItemId`] handed out by the
//! gallery's item arena; an id whose item was disposed never resolves again.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a group or item inside a gallery.
    pub struct ItemId;
}

/// Lifecycle of an item slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterializationState {
    /// The slot exists but no item has been created for it yet.
    Unrealized,
    /// The item exists and holds content.
    Realized,
    /// The item was removed or cleared; its id no longer resolves.
    Disposed,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Default selection highlight.
    pub const SELECTION: Self = Self::rgb(51, 153, 255);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Font request used when measuring text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Line height in pixels.
    pub height: i32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, height: i32) -> Self {
        Self {
            family: family.into(),
            height,
        }
    }
}

/// Optional per-item style overrides.
///
/// `None` means "inherit": first from the parent group, then from the
/// gallery's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStyle {
    pub font: Option<FontSpec>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl ItemStyle {
    /// Fill unset fields from `parent`.
    pub fn inherit(&self, parent: &ItemStyle) -> ItemStyle {
        ItemStyle {
            font: self.font.clone().or_else(|| parent.font.clone()),
            foreground: self.foreground.or(parent.foreground),
            background: self.background.or(parent.background),
        }
    }
}

/// Fully resolved style with no inherited fields left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedStyle {
    pub font: FontSpec,
    pub foreground: Color,
    pub background: Color,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::new("sans-serif", 12),
            foreground: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

/// Overlay marker positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn slot(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// Decoration markers drawn over an item's corners.
///
/// Markers are opaque keys; the renderer decides what they look like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorations {
    corners: [Option<String>; 4],
}

impl Decorations {
    pub fn get(&self, corner: Corner) -> Option<&str> {
        self.corners[corner.slot()].as_deref()
    }

    pub fn set(&mut self, corner: Corner, marker: Option<String>) {
        self.corners[corner.slot()] = marker;
    }

    pub fn is_empty(&self) -> bool {
        self.corners.iter().all(Option::is_none)
    }
}

/// Pixel size of an item's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: i32,
    pub height: i32,
}

impl ImageSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Scale to fit inside `max_width` x `max_height`, keeping the aspect ratio.
    ///
    /// Degenerate sizes fit to zero.
    pub fn best_fit(self, max_width: i32, max_height: i32) -> ImageSize {
        if self.width <= 0 || self.height <= 0 || max_width <= 0 || max_height <= 0 {
            return ImageSize::new(0, 0);
        }
        let ratio_w = max_width as f64 / self.width as f64;
        let ratio_h = max_height as f64 / self.height as f64;
        let ratio = ratio_w.min(ratio_h);
        ImageSize::new(
            (self.width as f64 * ratio).round() as i32,
            (self.height as f64 * ratio).round() as i32,
        )
    }
}

/// The content of a group or item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemContent {
    /// Text slots; slot 0 is the title.
    pub text: Vec<String>,
    pub image: Option<ImageSize>,
    pub decorations: Decorations,
    pub style: ItemStyle,
}

impl ItemContent {
    /// Content with a single title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            text: vec![title.into()],
            ..Self::default()
        }
    }

    /// Builder-style image size setter.
    pub fn with_image(mut self, width: i32, height: i32) -> Self {
        self.image = Some(ImageSize::new(width, height));
        self
    }

    /// Builder-style text slot setter, growing the slot list as needed.
    pub fn with_text(mut self, slot: usize, text: impl Into<String>) -> Self {
        if self.text.len() <= slot {
            self.text.resize(slot + 1, String::new());
        }
        self.text[slot] = text.into();
        self
    }

    pub fn title(&self) -> &str {
        self.text.first().map(String::as_str).unwrap_or("")
    }

    /// Text in `slot`, empty when unset.
    pub fn text(&self, slot: usize) -> &str {
        self.text.get(slot).map(String::as_str).unwrap_or("")
    }

    /// Number of non-empty text slots, never less than one.
    pub fn text_lines(&self) -> i32 {
        let extra = self.text.iter().skip(1).filter(|t| !t.is_empty()).count() as i32;
        1 + extra
    }
}
