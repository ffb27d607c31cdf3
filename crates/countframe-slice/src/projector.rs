//! Region edges as seen on one slice of one plane.

use countframe_geom::{
    FaceKind, FaceSide, InPlane, Margins, RegionGeometry, Side, SliceBoundary, SliceStack,
};
use countframe_math::{Axis, AxisPermutation, Plane, Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::path::Polyline;

/// One of the four in-plane edges of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// Near horizontal edge (inclusion).
    Left,
    /// Near vertical edge (inclusion).
    Top,
    /// Far horizontal edge (exclusion).
    Right,
    /// Far vertical edge (exclusion).
    Bottom,
}

impl Edge {
    /// All edges in drawing order.
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    fn index(self) -> usize {
        self as usize
    }

    /// Near or far.
    pub fn side(self) -> Side {
        match self {
            Edge::Left | Edge::Top => Side::Near,
            Edge::Right | Edge::Bottom => Side::Far,
        }
    }

    /// Inclusion for left and top, exclusion for right and bottom.
    pub fn kind(self) -> FaceKind {
        self.side().into()
    }

    /// World axis this edge moves along when dragged in `plane`.
    pub fn axis(self, plane: Plane) -> Axis {
        let view = plane.permutation();
        match self {
            Edge::Left | Edge::Right => view.horizontal,
            Edge::Top | Edge::Bottom => view.vertical,
        }
    }

    /// Region side whose margin this edge controls in `plane`.
    pub fn face_side(self, plane: Plane) -> FaceSide {
        FaceSide::new(self.axis(plane), self.side())
    }
}

/// Geometry of one edge on a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    /// Which edge.
    pub edge: Edge,
    /// Whether the edge is drawn.
    pub visible: bool,
    /// Points in view coordinates, empty when hidden.
    pub polyline: Polyline,
}

/// The four edges of a region on one slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceFace {
    /// Plane of the view.
    pub plane: Plane,
    /// Slice position along the plane normal.
    pub coordinate: f64,
    /// Region revision the edges were derived from.
    pub revision: u64,
    edges: [EdgeGeometry; 4],
}

impl SliceFace {
    /// A face with every edge hidden.
    pub fn hidden(plane: Plane, coordinate: f64, revision: u64) -> Self {
        Self {
            plane,
            coordinate,
            revision,
            edges: Edge::ALL.map(|edge| EdgeGeometry {
                edge,
                visible: false,
                polyline: Polyline::default(),
            }),
        }
    }

    /// All four edges.
    pub fn edges(&self) -> &[EdgeGeometry; 4] {
        &self.edges
    }

    /// One edge.
    pub fn edge(&self, edge: Edge) -> &EdgeGeometry {
        &self.edges[edge.index()]
    }

    /// True if the region crosses this slice.
    pub fn is_visible(&self) -> bool {
        self.edges.iter().any(|e| e.visible)
    }

    /// Closest visible edge within `tolerance` of `p` (view coordinates).
    pub fn edge_near(&self, p: &Point2, tolerance: f64) -> Option<Edge> {
        self.edges
            .iter()
            .filter(|e| e.visible)
            .filter_map(|e| Some((e.edge, e.polyline.distance_to(p)?)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(edge, _)| edge)
    }
}

/// Derives [`SliceFace`]s for one plane.
///
/// When the plane normal is the stack's depth axis the slice cuts across
/// every outline and the edges are the margin-adjusted outline at that
/// depth. Otherwise the slice runs along the stack: two edges become caps
/// at the upper and lower bounding depths and the other two become
/// polylines through every outline in between.
#[derive(Debug, Clone, Copy)]
pub struct SliceFaceProjector {
    plane: Plane,
}

impl SliceFaceProjector {
    /// Projector for `plane`.
    pub fn new(plane: Plane) -> Self {
        Self { plane }
    }

    /// Plane of this projector.
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Edges of `region` on the slice at `coordinate` along the plane normal.
    pub fn project(&self, region: &RegionGeometry, coordinate: f64) -> SliceFace {
        let stack = region.reference_stack();
        let margins = region.margins();
        let face = if stack.axes().depth == self.plane.normal() {
            self.across(&stack, &margins, coordinate, region.revision())
        } else {
            self.along(&stack, &margins, coordinate, region.revision())
        };
        trace!(
            plane = ?self.plane,
            coordinate,
            revision = face.revision,
            visible = face.is_visible(),
            "projected slice face"
        );
        face
    }

    fn across(&self, stack: &SliceStack, margins: &Margins, coordinate: f64, revision: u64) -> SliceFace {
        let hidden = SliceFace::hidden(self.plane, coordinate, revision);
        let Some((lo, hi)) = stack.adjusted_depth_range(margins) else {
            return hidden;
        };
        if coordinate < lo || coordinate > hi {
            return hidden;
        }
        let Some(outline) = stack.boundary_at(coordinate) else {
            return hidden;
        };
        let axes = *stack.axes();
        let outline = outline.adjusted(margins, &axes);

        self.build(coordinate, revision, |axis, side| match in_plane_role(&axes, axis) {
            Some(role) => {
                let (from, to) = outline_edge(&outline, role, side);
                vec![lift(&axes, from, coordinate), lift(&axes, to, coordinate)]
            }
            None => Vec::new(),
        })
    }

    fn along(&self, stack: &SliceStack, margins: &Margins, coordinate: f64, revision: u64) -> SliceFace {
        let hidden = SliceFace::hidden(self.plane, coordinate, revision);
        let axes = *stack.axes();
        let Some(cross) = in_plane_role(&axes, self.plane.normal()) else {
            return hidden;
        };
        let (Some((lo, hi)), Some((upper, lower))) = (
            stack.adjusted_depth_range(margins),
            stack.bounding_indices(margins),
        ) else {
            return hidden;
        };

        let crosses = stack.slices()[upper..=lower].iter().any(|s| {
            let (min, max) = s.adjusted(margins, &axes).extent(cross);
            coordinate >= min && coordinate <= max
        });
        if !crosses || hi <= lo {
            return hidden;
        }

        let outlines: Vec<SliceBoundary> = stack
            .depth_samples(lo, hi)
            .into_iter()
            .filter_map(|d| stack.boundary_at(d))
            .map(|b| b.adjusted(margins, &axes))
            .collect();
        let (Some(first), Some(last)) = (outlines.first(), outlines.last()) else {
            return hidden;
        };

        self.build(coordinate, revision, |axis, side| {
            let at = |b: &SliceBoundary, s: Side| lift(&axes, b.edge_point(cross, s, coordinate), b.depth);
            if axis == axes.depth {
                let cap = match side {
                    Side::Near => first,
                    Side::Far => last,
                };
                vec![at(cap, Side::Near), at(cap, Side::Far)]
            } else {
                outlines.iter().map(|b| at(b, side)).collect()
            }
        })
    }

    /// Assemble a visible face from world-space points per (axis, side).
    fn build(
        &self,
        coordinate: f64,
        revision: u64,
        points: impl Fn(Axis, Side) -> Vec<Point3>,
    ) -> SliceFace {
        let view = self.plane.permutation();
        SliceFace {
            plane: self.plane,
            coordinate,
            revision,
            edges: Edge::ALL.map(|edge| EdgeGeometry {
                edge,
                visible: true,
                polyline: Polyline::new(
                    points(edge.axis(self.plane), edge.side())
                        .iter()
                        .map(|p| view.project(p))
                        .collect(),
                ),
            }),
        }
    }
}

fn in_plane_role(axes: &AxisPermutation, axis: Axis) -> Option<InPlane> {
    if axis == axes.horizontal {
        Some(InPlane::Horizontal)
    } else if axis == axes.vertical {
        Some(InPlane::Vertical)
    } else {
        None
    }
}

/// End points of the outline edge on `side` of the `role` axis.
fn outline_edge(outline: &SliceBoundary, role: InPlane, side: Side) -> (Point2, Point2) {
    use countframe_geom::Corner::*;
    let (a, b) = match (role, side) {
        (InPlane::Horizontal, Side::Near) => (LeftTop, LeftBottom),
        (InPlane::Horizontal, Side::Far) => (RightTop, RightBottom),
        (InPlane::Vertical, Side::Near) => (LeftTop, RightTop),
        (InPlane::Vertical, Side::Far) => (LeftBottom, RightBottom),
    };
    (outline.corner(a), outline.corner(b))
}

fn lift(axes: &AxisPermutation, p: Point2, depth: f64) -> Point3 {
    axes.lift(&p, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use countframe_geom::MarginPolicy;

    fn boxed() -> RegionGeometry {
        let mut region =
            RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 80.0, 0.0, 20.0], [1.0; 3]).unwrap();
        assert!(region.set_margins([10.0, 5.0, 2.0], [20.0, 15.0, 3.0]));
        region
    }

    fn points(face: &SliceFace, edge: Edge) -> Vec<(f64, f64)> {
        face.edge(edge).polyline.points.iter().map(|p| (p.x, p.y)).collect()
    }

    fn stacked(slices: Vec<SliceBoundary>) -> RegionGeometry {
        let stack = SliceStack::new(AxisPermutation::IDENTITY, slices).unwrap();
        RegionGeometry::new("a", MarginPolicy::Adaptive { stack }, [1.0; 3]).unwrap()
    }

    #[test]
    fn test_edge_roles() {
        assert_eq!(Edge::Left.axis(Plane::Axial), Axis::X);
        assert_eq!(Edge::Top.axis(Plane::Coronal), Axis::Z);
        assert_eq!(Edge::Left.axis(Plane::Sagittal), Axis::Z);
        assert_eq!(Edge::Bottom.face_side(Plane::Sagittal), FaceSide::Bottom);
        assert_eq!(Edge::Right.kind(), FaceKind::Exclusion);
    }

    #[test]
    fn test_axial_box() {
        let region = boxed();
        let face = SliceFaceProjector::new(Plane::Axial).project(&region, 10.0);
        assert!(face.is_visible());
        assert_eq!(points(&face, Edge::Left), vec![(10.0, 5.0), (10.0, 65.0)]);
        assert_eq!(points(&face, Edge::Right), vec![(80.0, 5.0), (80.0, 65.0)]);
        assert_eq!(points(&face, Edge::Top), vec![(10.0, 5.0), (80.0, 5.0)]);
        assert_eq!(points(&face, Edge::Bottom), vec![(10.0, 65.0), (80.0, 65.0)]);
    }

    #[test]
    fn test_axial_depth_limits() {
        let region = boxed();
        let projector = SliceFaceProjector::new(Plane::Axial);
        assert!(!projector.project(&region, 1.0).is_visible());
        assert!(projector.project(&region, 17.0).is_visible());
        let past = projector.project(&region, 17.5);
        assert!(past.edges().iter().all(|e| !e.visible && e.polyline.is_empty()));
    }

    #[test]
    fn test_coronal_box() {
        let region = boxed();
        let projector = SliceFaceProjector::new(Plane::Coronal);
        let face = projector.project(&region, 40.0);
        // coronal view: horizontal x, vertical z
        assert_eq!(points(&face, Edge::Left), vec![(10.0, 2.0), (10.0, 17.0)]);
        assert_eq!(points(&face, Edge::Top), vec![(10.0, 2.0), (80.0, 2.0)]);
        assert_eq!(points(&face, Edge::Bottom), vec![(10.0, 17.0), (80.0, 17.0)]);
        assert!(!projector.project(&region, 2.0).is_visible());
        assert!(projector.project(&region, 65.0).is_visible());
        assert!(!projector.project(&region, 66.0).is_visible());
    }

    #[test]
    fn test_sagittal_box() {
        let region = boxed();
        let face = SliceFaceProjector::new(Plane::Sagittal).project(&region, 50.0);
        // sagittal view: horizontal z, vertical y
        assert_eq!(points(&face, Edge::Left), vec![(2.0, 5.0), (2.0, 65.0)]);
        assert_eq!(points(&face, Edge::Right), vec![(17.0, 5.0), (17.0, 65.0)]);
        assert_eq!(points(&face, Edge::Top), vec![(2.0, 5.0), (17.0, 5.0)]);
    }

    #[test]
    fn test_adaptive_polylines_follow_slices() {
        let region = stacked(vec![
            SliceBoundary::rect(0.0, 0.0, 100.0, 0.0, 100.0),
            SliceBoundary::rect(10.0, 40.0, 60.0, 10.0, 90.0),
            SliceBoundary::rect(20.0, 0.0, 100.0, 0.0, 100.0),
        ]);
        let face = SliceFaceProjector::new(Plane::Sagittal).project(&region, 50.0);
        assert_eq!(
            points(&face, Edge::Top),
            vec![(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]
        );
        assert_eq!(points(&face, Edge::Left), vec![(0.0, 0.0), (0.0, 100.0)]);

        let axial = SliceFaceProjector::new(Plane::Axial).project(&region, 5.0);
        assert_eq!(points(&axial, Edge::Left), vec![(20.0, 5.0), (20.0, 95.0)]);
    }

    #[test]
    fn test_adaptive_visibility_scans_bounded_slices_only() {
        let mut region = stacked(vec![
            SliceBoundary::rect(0.0, 0.0, 100.0, 0.0, 100.0),
            SliceBoundary::rect(10.0, 40.0, 60.0, 0.0, 100.0),
            SliceBoundary::rect(20.0, 40.0, 60.0, 0.0, 100.0),
        ]);
        let projector = SliceFaceProjector::new(Plane::Sagittal);
        assert!(projector.project(&region, 20.0).is_visible());

        assert!(region.set_margins([0.0, 0.0, 15.0], [0.0; 3]));
        let face = projector.project(&region, 20.0);
        assert!(!face.is_visible());
        assert!(projector.project(&region, 50.0).is_visible());
    }

    #[test]
    fn test_two_slice_minimum_and_empty_stack() {
        let region = stacked(vec![
            SliceBoundary::rect(0.0, 0.0, 10.0, 0.0, 10.0),
            SliceBoundary::rect(4.0, 0.0, 10.0, 0.0, 10.0),
        ]);
        for plane in Plane::ALL {
            assert!(SliceFaceProjector::new(plane).project(&region, 2.0).is_visible());
        }
        let empty = stacked(Vec::new());
        for plane in Plane::ALL {
            assert!(!SliceFaceProjector::new(plane).project(&empty, 2.0).is_visible());
        }
    }

    #[test]
    fn test_edge_near() {
        let region = boxed();
        let face = SliceFaceProjector::new(Plane::Axial).project(&region, 10.0);
        assert_eq!(face.edge_near(&Point2::new(11.0, 30.0), 2.0), Some(Edge::Left));
        assert_eq!(face.edge_near(&Point2::new(60.0, 64.0), 2.0), Some(Edge::Bottom));
        assert_eq!(face.edge_near(&Point2::new(50.0, 30.0), 2.0), None);
        let hidden = SliceFace::hidden(Plane::Axial, 0.0, 0);
        assert_eq!(hidden.edge_near(&Point2::new(10.0, 30.0), 100.0), None);
    }
}
