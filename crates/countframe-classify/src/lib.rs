#![warn(missing_docs)]

//! Inclusion/exclusion classification for object counting.
//!
//! Given a region, decides whether a point or an object's bounding box lies
//! in the counted inclusion zone, in the excluded margin band, or outside
//! the region altogether.
//!
//! # Example
//!
//! ```
//! use countframe_classify::{Classification, VolumeClassifier};
//! use countframe_geom::RegionGeometry;
//! use countframe_math::Point3;
//!
//! let mut region =
//!     RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3]).unwrap();
//! assert!(region.set_margins([10.0, 10.0, 0.0], [10.0, 10.0, 0.0]));
//!
//! let classifier = VolumeClassifier::new(&region);
//! assert_eq!(
//!     classifier.classify_point(&Point3::new(5.0, 50.0, 5.0)),
//!     Classification::InsideExclusion
//! );
//! ```

pub mod classify;

pub use classify::{Classification, VolumeClassifier};
