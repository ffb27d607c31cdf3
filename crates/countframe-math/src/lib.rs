#![warn(missing_docs)]

//! Math types for counting regions.
//!
//! Thin wrappers around nalgebra providing the point aliases used across the
//! workspace, plus the axis bookkeeping that lets one piece of code
//! serve the axial, coronal and sagittal views alike.

mod bbox;

pub use bbox::Aabb3;

use serde::{Deserialize, Serialize};

/// A point in 3D world space (nm).
pub type Point3 = nalgebra::Point3<f64>;

/// A point in a 2D view or slice plane.
pub type Point2 = nalgebra::Point2<f64>;

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis of the axial view.
    X,
    /// Vertical axis of the axial view.
    Y,
    /// Stack (depth) axis of the axial view.
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Read this axis' component from a point.
    pub fn of(self, p: &Point3) -> f64 {
        p[self.index()]
    }
}

/// Which world axis plays which role for a given view or slice stack.
///
/// `horizontal` and `vertical` span the in-plane coordinates, `depth` is the
/// axis the slices are stacked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPermutation {
    /// In-plane horizontal axis (left to right).
    pub horizontal: Axis,
    /// In-plane vertical axis (top to bottom).
    pub vertical: Axis,
    /// Depth axis (upper to lower).
    pub depth: Axis,
}

impl AxisPermutation {
    /// x horizontal, y vertical, z depth.
    pub const IDENTITY: Self = Self {
        horizontal: Axis::X,
        vertical: Axis::Y,
        depth: Axis::Z,
    };

    /// Build a permutation, returning `None` if an axis is used twice.
    pub fn new(horizontal: Axis, vertical: Axis, depth: Axis) -> Option<Self> {
        if horizontal == vertical || horizontal == depth || vertical == depth {
            return None;
        }
        Some(Self {
            horizontal,
            vertical,
            depth,
        })
    }

    /// Drop the depth component of a world point.
    pub fn project(&self, p: &Point3) -> Point2 {
        Point2::new(self.horizontal.of(p), self.vertical.of(p))
    }

    /// Rebuild a world point from in-plane coordinates and a depth.
    pub fn lift(&self, p: &Point2, depth: f64) -> Point3 {
        let mut out = Point3::origin();
        out[self.horizontal.index()] = p.x;
        out[self.vertical.index()] = p.y;
        out[self.depth.index()] = depth;
        out
    }
}

impl Default for AxisPermutation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The three orthogonal cutting planes a view can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// XY plane, sliced along z.
    Axial,
    /// XZ plane, sliced along y.
    Coronal,
    /// ZY plane, sliced along x.
    Sagittal,
}

impl Plane {
    /// All planes.
    pub const ALL: [Plane; 3] = [Plane::Axial, Plane::Coronal, Plane::Sagittal];

    /// Axis roles for this plane.
    pub fn permutation(self) -> AxisPermutation {
        match self {
            Plane::Axial => AxisPermutation::IDENTITY,
            Plane::Coronal => AxisPermutation {
                horizontal: Axis::X,
                vertical: Axis::Z,
                depth: Axis::Y,
            },
            Plane::Sagittal => AxisPermutation {
                horizontal: Axis::Z,
                vertical: Axis::Y,
                depth: Axis::X,
            },
        }
    }

    /// Axis perpendicular to the plane.
    pub fn normal(self) -> Axis {
        self.permutation().depth
    }
}

impl std::str::FromStr for Plane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "axial" | "xy" => Ok(Plane::Axial),
            "coronal" | "xz" => Ok(Plane::Coronal),
            "sagittal" | "yz" | "zy" => Ok(Plane::Sagittal),
            other => Err(format!("unknown plane '{other}'")),
        }
    }
}

/// Distance from `p` to the segment `a`-`b` in 2D.
pub fn point_to_segment_dist_2d(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-24 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_rejects_duplicates() {
        assert!(AxisPermutation::new(Axis::X, Axis::X, Axis::Z).is_none());
        assert!(AxisPermutation::new(Axis::Z, Axis::Y, Axis::X).is_some());
    }

    #[test]
    fn test_project_lift() {
        let p = Point3::new(1.0, 2.0, 3.0);
        for plane in Plane::ALL {
            let perm = plane.permutation();
            let q = perm.project(&p);
            let back = perm.lift(&q, perm.depth.of(&p));
            assert_eq!(back, p);
        }
    }

    #[test]
    fn test_plane_normals() {
        assert_eq!(Plane::Axial.normal(), Axis::Z);
        assert_eq!(Plane::Coronal.normal(), Axis::Y);
        assert_eq!(Plane::Sagittal.normal(), Axis::X);
    }

    #[test]
    fn test_plane_from_str() {
        assert_eq!("Coronal".parse::<Plane>(), Ok(Plane::Coronal));
        assert_eq!("xy".parse::<Plane>(), Ok(Plane::Axial));
        assert!("oblique".parse::<Plane>().is_err());
    }

    #[test]
    fn test_point_to_segment() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        approx::assert_relative_eq!(point_to_segment_dist_2d(&Point2::new(5.0, 3.0), &a, &b), 3.0);
        approx::assert_relative_eq!(point_to_segment_dist_2d(&Point2::new(-4.0, 3.0), &a, &b), 5.0);
        approx::assert_relative_eq!(point_to_segment_dist_2d(&Point2::new(1.0, 1.0), &a, &a), 2f64.sqrt());
    }
}
