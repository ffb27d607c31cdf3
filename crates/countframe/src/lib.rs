#![warn(missing_docs)]

//! Counting regions for stereology on image stacks.
//!
//! Re-exports the member crates and a [`prelude`] with the types most
//! programs need.
//!
//! # Example
//!
//! ```
//! use countframe::prelude::*;
//!
//! let mut region =
//!     RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3]).unwrap();
//! assert!(region.set_margins([10.0, 10.0, 1.0], [10.0, 10.0, 1.0]));
//!
//! let face = SliceFaceProjector::new(Plane::Axial).project(&region, 5.0);
//! assert!(face.edge(Edge::Left).visible);
//!
//! let classifier = VolumeClassifier::new(&region);
//! assert_eq!(
//!     classifier.classify_point(&Point3::new(50.0, 50.0, 5.0)),
//!     Classification::InsideInclusion
//! );
//! ```

pub use countframe_classify;
pub use countframe_geom;
pub use countframe_math;
pub use countframe_slice;
pub use countframe_widgets;

/// Commonly used types.
pub mod prelude {
    pub use countframe_classify::{Classification, VolumeClassifier};
    pub use countframe_geom::{
        format, FaceKind, FaceSide, MarginExtension, MarginPolicy, MarginViolation, Margins,
        OutlineSet, RegionError, RegionGeometry, RegionKind, RegionReport, RegionSettings, Side,
        SliceBoundary, SliceStack, StackBorders,
    };
    pub use countframe_math::{Aabb3, Axis, AxisPermutation, Plane, Point2, Point3};
    pub use countframe_slice::{Edge, SliceFace, SliceFaceProjector};
    pub use countframe_widgets::{
        EventOutcome, PointerEvent, PointerPicker, RegionChange, RegionList, RegionWidgetSet,
        WidgetId,
    };
}
