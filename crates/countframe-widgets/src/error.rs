//! Errors raised by widget sets and region lists.

use countframe_geom::{FormatError, MarginViolation, RegionError};
use thiserror::Error;

use crate::set::WidgetId;

/// Errors from widget set operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// The id does not name a widget of this set.
    #[error("unknown widget {0:?}")]
    UnknownWidget(WidgetId),

    /// The operation needs a planar view.
    #[error("widget {0:?} is not a planar view")]
    NotPlanar(WidgetId),

    /// The slice coordinate is NaN or infinite.
    #[error("invalid slice coordinate {0}")]
    InvalidSlice(f64),
}

/// Why one persisted region line could not be restored.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The line is not a valid region line.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The region could not be constructed.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// The stored margins do not fit the region's boundary.
    #[error("stored margins rejected: {0}")]
    Margins(#[from] MarginViolation),
}
