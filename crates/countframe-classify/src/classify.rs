//! Point and extent classification.

use countframe_geom::{FaceKind, InPlane, MarginPolicy, RegionGeometry, Side};
use countframe_math::{Aabb3, Axis, Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Where a point or object falls relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Inside the margin-adjusted region; counted.
    InsideInclusion,
    /// Inside the reference boundary but in the margin band; not counted.
    InsideExclusion,
    /// Outside the reference boundary.
    Outside,
}

/// Classifies against the current state of one region.
#[derive(Debug, Clone, Copy)]
pub struct VolumeClassifier<'a> {
    region: &'a RegionGeometry,
}

impl<'a> VolumeClassifier<'a> {
    /// Classifier over `region`.
    pub fn new(region: &'a RegionGeometry) -> Self {
        Self { region }
    }

    /// Classify a point.
    ///
    /// Inclusion boundaries belong to the inclusion region, exclusion
    /// boundaries do not.
    pub fn classify_point(&self, p: &Point3) -> Classification {
        match self.region.policy() {
            MarginPolicy::Rectangular { bounds } => self.classify_in_box(bounds, p),
            MarginPolicy::Adaptive { .. } => self.classify_in_stack(p),
        }
    }

    /// Per-axis distance test against the box and its adjusted faces.
    fn classify_in_box(&self, bounds: &Aabb3, p: &Point3) -> Classification {
        let margins = self.region.margins();
        let mut excluded = false;
        for axis in Axis::ALL {
            let (min, max) = bounds.range(axis);
            let v = axis.of(p);
            if v < min || v > max {
                return Classification::Outside;
            }
            let from_near = v - (min + margins.get(axis, Side::Near));
            let to_far = (max - margins.get(axis, Side::Far)) - v;
            if from_near < 0.0 || to_far <= 0.0 {
                excluded = true;
            }
        }
        if excluded {
            Classification::InsideExclusion
        } else {
            Classification::InsideInclusion
        }
    }

    /// Test against the outline interpolated at the point's depth.
    fn classify_in_stack(&self, p: &Point3) -> Classification {
        let stack = self.region.reference_stack();
        let axes = *stack.axes();
        let depth = axes.depth.of(p);
        let q = axes.project(p);

        let Some(outline) = stack.boundary_at(depth) else {
            return Classification::Outside;
        };
        if !outline.contains(&q, true) {
            return Classification::Outside;
        }

        let inside = stack
            .adjusted_depth_range(&self.region.margins())
            .filter(|&(lo, hi)| depth >= lo && depth < hi)
            .map(|_| outline.adjusted(&self.region.margins(), &axes))
            .is_some_and(|adjusted| adjusted.contains(&q, false));
        if inside {
            Classification::InsideInclusion
        } else {
            Classification::InsideExclusion
        }
    }

    /// Classify an object by its bounding box.
    ///
    /// An object clear of the reference boundary is outside. One touching any
    /// exclusion face is excluded even if it also touches an inclusion face.
    /// Otherwise it is included if it touches an inclusion face or overlaps
    /// the inclusion region, and excluded if it lies wholly in the margin band.
    pub fn classify_extent(&self, extent: &Aabb3) -> Classification {
        let Some(bounds) = self.region.policy().bounds() else {
            return Classification::Outside;
        };
        if !bounds.overlaps(extent) {
            return Classification::Outside;
        }

        let faces = self.region.compute_faces();
        let touches = |kind: FaceKind| faces.of_kind(kind).any(|f| f.aabb().overlaps(extent));
        let result = if touches(FaceKind::Exclusion) {
            Classification::InsideExclusion
        } else if touches(FaceKind::Inclusion) || self.overlaps_inclusion(extent) {
            Classification::InsideInclusion
        } else {
            Classification::InsideExclusion
        };
        trace!(region = self.region.id(), ?result, "classified extent");
        result
    }

    /// Whether `extent` overlaps the margin-adjusted interior.
    fn overlaps_inclusion(&self, extent: &Aabb3) -> bool {
        let stack = self.region.reference_stack();
        let axes = *stack.axes();
        let margins = self.region.margins();
        let Some((lo, hi)) = stack.adjusted_depth_range(&margins) else {
            return false;
        };
        let depths = stack.depth_samples(lo, hi);
        let outlines: Vec<_> = depths
            .iter()
            .filter_map(|&d| stack.boundary_at(d))
            .map(|b| b.adjusted(&margins, &axes))
            .collect();

        outlines.windows(2).any(|pair| {
            let mut slab = Aabb3::empty();
            for outline in pair {
                let (left, right) = outline.inscribed(InPlane::Horizontal);
                let (top, bottom) = outline.inscribed(InPlane::Vertical);
                if left >= right || top >= bottom {
                    return false;
                }
                slab.include_point(&axes.lift(&Point2::new(left, top), outline.depth));
                slab.include_point(&axes.lift(&Point2::new(right, bottom), outline.depth));
            }
            slab.overlaps(extent)
        })
    }

    /// Whether an object of `category` with bounding box `extent` is counted.
    ///
    /// Regions with a category constraint only count categories starting
    /// with it.
    pub fn is_counted(&self, extent: &Aabb3, category: &str) -> bool {
        if let Some(constraint) = self.region.constraint() {
            if !category.starts_with(constraint) {
                return false;
            }
        }
        self.classify_extent(extent) == Classification::InsideInclusion
    }
}
