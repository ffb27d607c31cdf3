//! Error types for region geometry.

use countframe_math::Axis;
use thiserror::Error;

/// Errors raised while building or configuring a region.
#[derive(Error, Debug)]
pub enum RegionError {
    /// Slice outline data does not describe a valid stack.
    #[error("malformed boundary: {0}")]
    MalformedBoundary(String),

    /// Voxel spacing must be positive and finite on every axis.
    #[error("invalid spacing {0:?}")]
    InvalidSpacing([f64; 3]),

    /// Image data does not match the declared dimensions.
    #[error("image stack has {actual} voxels, expected {expected}")]
    ImageSize {
        /// Voxel count implied by the dimensions.
        expected: usize,
        /// Voxel count actually supplied.
        actual: usize,
    },

    /// Invalid settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be parsed.
    #[error("failed to parse settings: {0}")]
    Config(#[from] toml::de::Error),

    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a margin proposal was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginViolation {
    /// A margin was negative, NaN or infinite.
    #[error("margin on {axis:?} must be a non-negative finite value, got {value}")]
    InvalidValue {
        /// Axis of the offending margin.
        axis: Axis,
        /// The rejected value.
        value: f64,
    },

    /// Opposite edges would cross or come closer than the axis resolution.
    #[error(
        "edges cross on {axis:?}{}: {near} + {resolution} > {far}",
        .slice.map(|s| format!(" at slice {s}")).unwrap_or_default()
    )]
    Crossing {
        /// Axis along which the edges collide.
        axis: Axis,
        /// Slice index where the collision happens, `None` for the depth axis.
        slice: Option<usize>,
        /// Near boundary plus inclusion offset.
        near: f64,
        /// Far boundary minus exclusion offset.
        far: f64,
        /// Minimum separation on this axis.
        resolution: f64,
    },
}

/// Errors raised while parsing a serialized region line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The line has no `=` between type and values.
    #[error("missing '=' in region line")]
    MissingSeparator,

    /// The region type is not recognized.
    #[error("unknown region type '{0}'")]
    UnknownType(String),

    /// The value list does not have six entries.
    #[error("expected 6 margin values, found {0}")]
    FieldCount(usize),

    /// A value could not be parsed as a number.
    #[error("invalid margin value '{text}' at position {index}")]
    InvalidNumber {
        /// Zero-based position of the value.
        index: usize,
        /// The unparseable text.
        text: String,
    },

    /// The values parsed but do not form valid margins.
    #[error(transparent)]
    InvalidMargins(#[from] MarginViolation),
}

/// Result type for region operations.
pub type Result<T> = std::result::Result<T, RegionError>;
