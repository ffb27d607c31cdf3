//! Labeled boundary faces of a region.

use countframe_math::{Aabb3, Axis, Point3};
use serde::{Deserialize, Serialize};

use crate::margins::Side;

/// Whether touching a face counts an object in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceKind {
    /// Objects touching this face are counted.
    Inclusion,
    /// Objects touching this face are not counted.
    Exclusion,
}

impl From<Side> for FaceKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Near => FaceKind::Inclusion,
            Side::Far => FaceKind::Exclusion,
        }
    }
}

/// The six logical sides of a region, one per margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceSide {
    /// Near x.
    Left,
    /// Near y.
    Top,
    /// Near z.
    Upper,
    /// Far x.
    Right,
    /// Far y.
    Bottom,
    /// Far z.
    Lower,
}

impl FaceSide {
    /// All sides in serialization order.
    pub const ALL: [FaceSide; 6] = [
        FaceSide::Left,
        FaceSide::Top,
        FaceSide::Upper,
        FaceSide::Right,
        FaceSide::Bottom,
        FaceSide::Lower,
    ];

    /// The side of `axis` on `side`.
    pub fn new(axis: Axis, side: Side) -> Self {
        match (axis, side) {
            (Axis::X, Side::Near) => FaceSide::Left,
            (Axis::Y, Side::Near) => FaceSide::Top,
            (Axis::Z, Side::Near) => FaceSide::Upper,
            (Axis::X, Side::Far) => FaceSide::Right,
            (Axis::Y, Side::Far) => FaceSide::Bottom,
            (Axis::Z, Side::Far) => FaceSide::Lower,
        }
    }

    /// World axis the side is perpendicular to.
    pub fn axis(self) -> Axis {
        match self {
            FaceSide::Left | FaceSide::Right => Axis::X,
            FaceSide::Top | FaceSide::Bottom => Axis::Y,
            FaceSide::Upper | FaceSide::Lower => Axis::Z,
        }
    }

    /// Near or far boundary.
    pub fn side(self) -> Side {
        match self {
            FaceSide::Left | FaceSide::Top | FaceSide::Upper => Side::Near,
            FaceSide::Right | FaceSide::Bottom | FaceSide::Lower => Side::Far,
        }
    }

    /// Inclusion for near sides, exclusion for far ones.
    pub fn kind(self) -> FaceKind {
        self.side().into()
    }
}

/// One quad of the region boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Side of the region this quad belongs to.
    pub side: FaceSide,
    /// Corners in winding order.
    pub corners: [Point3; 4],
}

impl Face {
    /// Inclusion or exclusion.
    pub fn kind(&self) -> FaceKind {
        self.side.kind()
    }

    /// Bounding box of the quad.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_points(&self.corners)
    }
}

/// Faces derived from one state of a region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceSet {
    /// Revision of the region the faces were built from.
    pub revision: u64,
    /// All faces, inclusion and exclusion mixed.
    pub faces: Vec<Face>,
}

impl FaceSet {
    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when the region has no faces (no data).
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Faces of one kind.
    pub fn of_kind(&self, kind: FaceKind) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(move |f| f.kind() == kind)
    }

    /// Faces on one side.
    pub fn on_side(&self, side: FaceSide) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(move |f| f.side == side)
    }
}
