//! Error types for the gallery crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by gallery mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// A position was outside `0..=count` for insertion or `0..count` otherwise.
    #[error("position {position} is out of range for a collection of {count} items")]
    InvalidRange { position: usize, count: usize },

    /// The item does not exist or has already been disposed.
    #[error("item is absent or disposed")]
    NullArgument,

    /// The item is not a group and cannot own children.
    #[error("item is not a group")]
    NotAGroup,

    /// A realization result arrived for a request that is no longer current.
    #[error("realization result is stale")]
    StaleRealization,
}

/// Result type for gallery operations.
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Errors that can occur while loading a [`GalleryConfig`](crate::GalleryConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed correctly but is out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Errors reported by a [`ContentProvider`](crate::ContentProvider).
///
/// Provider failures never propagate out of the gallery: the affected group
/// is realized empty and the failure is logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider has no data for the requested position.
    #[error("no content for group {group}")]
    MissingGroup { group: usize },

    /// The provider has no data for the requested child.
    #[error("no content for item {index} of group {group}")]
    MissingItem { group: usize, index: usize },

    /// Any other provider-specific failure.
    #[error("content provider failed: {0}")]
    Other(String),
}
