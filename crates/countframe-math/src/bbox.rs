//! Axis-aligned bounding boxes.
//!
//! Used both for the reference box of rectangular regions and as the
//! broadphase when testing object extents against region faces.

use crate::{Axis, Point3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn from_bounds(b: [f64; 6]) -> Self {
        Self {
            min: Point3::new(b[0], b[2], b[4]),
            max: Point3::new(b[1], b[3], b[5]),
        }
    }

    /// Back to `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn to_bounds(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if no point has been included yet (or the box is inverted).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test if a point lies inside or on the box.
    pub fn contains_point(&self, p: &Point3) -> bool {
        Axis::ALL.iter().all(|&a| {
            let (lo, hi) = self.range(a);
            let v = a.of(p);
            v >= lo && v <= hi
        })
    }

    /// `(min, max)` along one axis.
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        (axis.of(&self.min), axis.of(&self.max))
    }

    /// Extent along one axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        let (lo, hi) = self.range(axis);
        hi - lo
    }

    /// Enclosed volume, zero for empty or inverted boxes.
    pub fn volume(&self) -> f64 {
        Axis::ALL
            .iter()
            .map(|&a| self.extent(a).max(0.0))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let b = Aabb3::new(Point3::new(5.0, 5.0, 5.0), Point3::new(15.0, 15.0, 15.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = Aabb3::new(Point3::new(20.0, 20.0, 20.0), Point3::new(30.0, 30.0, 30.0));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_aabb_touching() {
        let a = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let b = Aabb3::new(Point3::new(10.0, 0.0, 0.0), Point3::new(20.0, 10.0, 10.0));
        assert!(a.overlaps(&b)); // touching counts
    }

    #[test]
    fn test_bounds_roundtrip_and_volume() {
        let b = [0.0, 100.0, 0.0, 100.0, 0.0, 10.0];
        let aabb = Aabb3::from_bounds(b);
        assert_eq!(aabb.to_bounds(), b);
        assert!((aabb.volume() - 100_000.0).abs() < 1e-9);
        assert!(aabb.contains_point(&Point3::new(100.0, 0.0, 5.0)));
        assert!(!aabb.contains_point(&Point3::new(100.1, 0.0, 5.0)));
    }

    #[test]
    fn test_empty_expands() {
        let mut aabb = Aabb3::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.volume(), 0.0);
        aabb.include_point(&Point3::new(1.0, 2.0, 3.0));
        aabb.include_point(&Point3::new(-1.0, 0.0, 5.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.range(Axis::X), (-1.0, 1.0));
        assert_eq!(aabb.extent(Axis::Z), 2.0);
    }
}
