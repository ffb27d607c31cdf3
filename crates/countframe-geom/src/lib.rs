#![warn(missing_docs)]

//! Geometry of counting regions.
//!
//! A region marks the part of an imaged volume whose objects are counted.
//! Its reference boundary is either a fixed box or a stack of per-slice
//! content outlines; six non-negative margins pull the counted (inclusion)
//! region inwards from it. Objects touching the left, top or upper faces are
//! counted, objects touching the right, bottom or lower faces are not.
//!
//! # Example
//!
//! ```
//! use countframe_geom::{format, RegionGeometry};
//!
//! let mut region =
//!     RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3])?;
//! assert!(region.set_margins([10.0, 10.0, 0.0], [10.0, 10.0, 0.0]));
//! assert_eq!(region.inclusion_volume(), 80.0 * 80.0 * 10.0);
//! assert_eq!(
//!     format::serialize(&region),
//!     "RectangularBoundingRegion=10.00,10.00,0.00,10.00,10.00,0.00"
//! );
//! # Ok::<(), countframe_geom::RegionError>(())
//! ```

pub mod borders;
pub mod error;
pub mod face;
pub mod format;
pub mod geometry;
pub mod margins;
pub mod policy;
pub mod report;
pub mod settings;
pub mod stack;

pub use borders::{ImageStack, StackBorders};
pub use error::{FormatError, MarginViolation, RegionError, Result};
pub use face::{Face, FaceKind, FaceSet, FaceSide};
pub use format::{RegionKind, RegionLine};
pub use geometry::RegionGeometry;
pub use margins::{Margins, Side};
pub use policy::{MarginExtension, MarginPolicy, OutlineRecord, OutlineSet};
pub use report::RegionReport;
pub use settings::RegionSettings;
pub use stack::{Corner, InPlane, SliceBoundary, SliceStack};
