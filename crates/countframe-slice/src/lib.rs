#![warn(missing_docs)]

//! Cross-sections of counting regions.
//!
//! A planar view shows a region as four edges. Left and top are inclusion
//! edges, right and bottom exclusion edges. [`SliceFaceProjector`] derives
//! their polylines and visibility for any of the three orthogonal planes
//! from one shared routine, parameterized by the plane's axis permutation.
//!
//! # Example
//!
//! ```
//! use countframe_geom::RegionGeometry;
//! use countframe_math::{Plane, Point2};
//! use countframe_slice::{Edge, SliceFaceProjector};
//!
//! let region =
//!     RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3]).unwrap();
//! let face = SliceFaceProjector::new(Plane::Axial).project(&region, 5.0);
//! assert!(face.is_visible());
//! assert_eq!(face.edge_near(&Point2::new(1.0, 50.0), 2.0), Some(Edge::Left));
//! ```

pub mod path;
pub mod projector;

pub use path::Polyline;
pub use projector::{Edge, EdgeGeometry, SliceFace, SliceFaceProjector};
