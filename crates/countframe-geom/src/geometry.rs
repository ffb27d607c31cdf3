//! The region itself: reference boundary, margins and everything derived
//! from them.

use std::cell::OnceCell;

use countframe_math::{lerp, Axis, Point3};
use tracing::{debug, warn};

use crate::error::{MarginViolation, RegionError, Result};
use crate::face::{Face, FaceSet, FaceSide};
use crate::format::RegionKind;
use crate::margins::{Margins, Side};
use crate::policy::{MarginExtension, MarginPolicy};
use crate::stack::{Corner, InPlane, SliceBoundary, SliceStack};

/// Bounds, margins and derived faces of one counting region.
///
/// Mutations go through [`try_set_margins`](Self::try_set_margins), which
/// keeps opposite edges at least one voxel apart on every visible slice.
/// Each accepted change bumps [`revision`](Self::revision) and drops the
/// cached faces.
#[derive(Debug, Clone)]
pub struct RegionGeometry {
    id: String,
    policy: MarginPolicy,
    margins: Margins,
    spacing: [f64; 3],
    constraint: Option<String>,
    revision: u64,
    faces: OnceCell<FaceSet>,
}

impl RegionGeometry {
    /// Create a region with zero margins.
    pub fn new(id: impl Into<String>, policy: MarginPolicy, spacing: [f64; 3]) -> Result<Self> {
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RegionError::InvalidSpacing(spacing));
        }
        Ok(Self {
            id: id.into(),
            policy,
            margins: Margins::ZERO,
            spacing,
            constraint: None,
            revision: 0,
            faces: OnceCell::new(),
        })
    }

    /// Rectangular region over `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn rectangular(id: impl Into<String>, bounds: [f64; 6], spacing: [f64; 3]) -> Result<Self> {
        Self::new(id, MarginPolicy::rectangular(bounds), spacing)
    }

    /// Adaptive region following the outlines of `ext`.
    pub fn adaptive(id: impl Into<String>, ext: &dyn MarginExtension) -> Result<Self> {
        Self::new(id, MarginPolicy::adaptive(ext)?, ext.spacing())
    }

    /// Restrict counting to objects of one category.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Region identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rename the region.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Reference boundary policy.
    pub fn policy(&self) -> &MarginPolicy {
        &self.policy
    }

    /// Persisted type.
    pub fn kind(&self) -> RegionKind {
        self.policy.kind()
    }

    /// Current committed margins.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Voxel spacing (nm).
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Minimum separation between opposite edges along `axis`.
    pub fn resolution(&self, axis: Axis) -> f64 {
        self.spacing[axis.index()]
    }

    /// Category constraint, if any.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Replace the category constraint.
    pub fn set_constraint(&mut self, constraint: Option<String>) {
        self.constraint = constraint;
    }

    /// Change counter, bumped on every accepted mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Reference boundary as a slice stack.
    pub fn reference_stack(&self) -> std::borrow::Cow<'_, SliceStack> {
        self.policy.reference_stack()
    }

    /// Replace the reference boundary, e.g. once adaptive outlines arrive.
    ///
    /// Margins that no longer fit the new boundary are reset to zero.
    pub fn set_policy(&mut self, policy: MarginPolicy) {
        self.policy = policy;
        if let Err(violation) = self.validate_margins(&self.margins) {
            warn!(region = %self.id, %violation, "margins do not fit new boundary, resetting");
            self.margins = Margins::ZERO;
        }
        self.invalidate();
    }

    /// Set both offset triples. Returns `false` and leaves the region
    /// untouched if the values are negative, non-finite or make edges cross.
    pub fn set_margins(&mut self, inclusion: [f64; 3], exclusion: [f64; 3]) -> bool {
        self.try_set_margins(Margins::new(inclusion, exclusion)).is_ok()
    }

    /// Validate and commit `margins`.
    pub fn try_set_margins(&mut self, margins: Margins) -> std::result::Result<(), MarginViolation> {
        self.validate_margins(&margins)?;
        if margins != self.margins {
            self.margins = margins;
            self.invalidate();
            debug!(
                region = %self.id,
                revision = self.revision,
                inclusion = ?margins.inclusion,
                exclusion = ?margins.exclusion,
                "margins committed"
            );
        }
        Ok(())
    }

    /// Check `margins` against the reference boundary without committing.
    ///
    /// Along the depth axis, and along both in-plane axes of every slice
    /// between the upper and lower bounding slices, the near boundary plus
    /// its inclusion offset plus the axis resolution must not pass the far
    /// boundary minus its exclusion offset.
    pub fn validate_margins(&self, margins: &Margins) -> std::result::Result<(), MarginViolation> {
        margins.check_values()?;

        let stack = self.policy.reference_stack();
        let Some((near, far)) = stack.adjusted_depth_range(margins) else {
            return Ok(());
        };
        let axes = *stack.axes();
        self.check_separation(axes.depth, None, near, far)?;

        let Some((upper, lower)) = stack.bounding_indices(margins) else {
            return Ok(());
        };
        for (i, slice) in stack.slices()[upper..=lower].iter().enumerate() {
            let adjusted = slice.adjusted(margins, &axes);
            for (axis, in_plane) in [
                (axes.horizontal, InPlane::Horizontal),
                (axes.vertical, InPlane::Vertical),
            ] {
                let (near, far) = adjusted.inscribed(in_plane);
                self.check_separation(axis, Some(upper + i), near, far)?;
            }
        }
        Ok(())
    }

    fn check_separation(
        &self,
        axis: Axis,
        slice: Option<usize>,
        near: f64,
        far: f64,
    ) -> std::result::Result<(), MarginViolation> {
        let resolution = self.resolution(axis);
        if near + resolution > far {
            return Err(MarginViolation::Crossing {
                axis,
                slice,
                near,
                far,
                resolution,
            });
        }
        Ok(())
    }

    /// Slices between the upper and lower bounding indices, margin-adjusted.
    pub fn visible_slices(&self) -> Vec<(usize, SliceBoundary)> {
        let stack = self.policy.reference_stack();
        let Some((upper, lower)) = stack.bounding_indices(&self.margins) else {
            return Vec::new();
        };
        stack.slices()[upper..=lower]
            .iter()
            .enumerate()
            .map(|(i, s)| (upper + i, s.adjusted(&self.margins, stack.axes())))
            .collect()
    }

    /// Margin-adjusted outline at `depth`, `None` outside the adjusted depth
    /// range.
    pub fn adjusted_boundary_at(&self, depth: f64) -> Option<SliceBoundary> {
        let stack = self.policy.reference_stack();
        let (lo, hi) = stack.adjusted_depth_range(&self.margins)?;
        if depth < lo || depth > hi {
            return None;
        }
        stack
            .boundary_at(depth)
            .map(|b| b.adjusted(&self.margins, stack.axes()))
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        self.faces = OnceCell::new();
    }

    /// Faces of the current state, built once per revision.
    pub fn compute_faces(&self) -> &FaceSet {
        self.faces.get_or_init(|| FaceSet {
            revision: self.revision,
            faces: match &self.policy {
                MarginPolicy::Rectangular { .. } => self.box_faces(),
                MarginPolicy::Adaptive { stack } => self.stacked_faces(stack),
            },
        })
    }

    /// Six faces of the margin-adjusted box.
    fn box_faces(&self) -> Vec<Face> {
        let Some(bounds) = self.policy.bounds() else {
            return Vec::new();
        };
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for axis in Axis::ALL {
            let (min, max) = bounds.range(axis);
            lo[axis.index()] = min + self.margins.inclusion(axis);
            hi[axis.index()] = max - self.margins.exclusion(axis);
        }

        FaceSide::ALL
            .iter()
            .map(|&side| {
                let a = side.axis().index();
                let (b, c) = ((a + 1) % 3, (a + 2) % 3);
                let level = match side.side() {
                    Side::Near => lo[a],
                    Side::Far => hi[a],
                };
                let corner = |u: f64, v: f64| {
                    let mut p = Point3::origin();
                    p[a] = level;
                    p[b] = u;
                    p[c] = v;
                    p
                };
                Face {
                    side,
                    corners: [
                        corner(lo[b], lo[c]),
                        corner(hi[b], lo[c]),
                        corner(hi[b], hi[c]),
                        corner(lo[b], hi[c]),
                    ],
                }
            })
            .collect()
    }

    /// Lateral faces per depth interval plus one cap at each end.
    fn stacked_faces(&self, stack: &SliceStack) -> Vec<Face> {
        let Some((lo, hi)) = stack.adjusted_depth_range(&self.margins) else {
            return Vec::new();
        };
        if hi <= lo {
            return Vec::new();
        }
        let axes = *stack.axes();
        let outlines: Vec<SliceBoundary> = stack
            .depth_samples(lo, hi)
            .into_iter()
            .filter_map(|d| stack.boundary_at(d))
            .map(|b| b.adjusted(&self.margins, &axes))
            .collect();

        let lift = |b: &SliceBoundary, c: Corner| axes.lift(&b.corner(c), b.depth);
        let lateral = [
            (FaceSide::new(axes.horizontal, Side::Near), Corner::LeftBottom, Corner::LeftTop),
            (FaceSide::new(axes.vertical, Side::Near), Corner::LeftTop, Corner::RightTop),
            (FaceSide::new(axes.horizontal, Side::Far), Corner::RightTop, Corner::RightBottom),
            (FaceSide::new(axes.vertical, Side::Far), Corner::RightBottom, Corner::LeftBottom),
        ];

        let mut faces = Vec::with_capacity(outlines.len().saturating_sub(1) * 4 + 2);
        for pair in outlines.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            for &(side, from, to) in &lateral {
                faces.push(Face {
                    side,
                    corners: [lift(a, from), lift(a, to), lift(b, to), lift(b, from)],
                });
            }
        }

        let cap = |b: &SliceBoundary, side: FaceSide| Face {
            side,
            corners: Corner::ALL.map(|c| lift(b, c)),
        };
        if let (Some(first), Some(last)) = (outlines.first(), outlines.last()) {
            faces.push(cap(first, FaceSide::new(axes.depth, Side::Near)));
            faces.push(cap(last, FaceSide::new(axes.depth, Side::Far)));
        }
        faces
    }

    /// Volume enclosed by the reference boundary (nm³).
    pub fn total_volume(&self) -> f64 {
        match &self.policy {
            MarginPolicy::Rectangular { bounds } => bounds.volume(),
            MarginPolicy::Adaptive { stack } => match stack.depth_range() {
                Some((first, last)) => stacked_volume(stack, first, last, &Margins::ZERO),
                None => 0.0,
            },
        }
    }

    /// Volume left after applying all margins (nm³).
    pub fn inclusion_volume(&self) -> f64 {
        match &self.policy {
            MarginPolicy::Rectangular { bounds } => Axis::ALL
                .iter()
                .map(|&a| {
                    (bounds.extent(a) - self.margins.inclusion(a) - self.margins.exclusion(a))
                        .max(0.0)
                })
                .product(),
            MarginPolicy::Adaptive { stack } => match stack.adjusted_depth_range(&self.margins) {
                Some((lo, hi)) if hi > lo => stacked_volume(stack, lo, hi, &self.margins),
                _ => 0.0,
            },
        }
    }

    /// Volume between the reference boundary and the inclusion region (nm³).
    pub fn exclusion_volume(&self) -> f64 {
        self.total_volume() - self.inclusion_volume()
    }
}

/// Trapezoidal sum of adjusted outline areas over `[lo, hi]`.
///
/// Areas vary linearly between slices, so a cut between two slices gets the
/// interpolated area rather than the area of an interpolated outline.
fn stacked_volume(stack: &SliceStack, lo: f64, hi: f64, margins: &Margins) -> f64 {
    let slices = stack.slices();
    let areas: Vec<f64> = slices
        .iter()
        .map(|s| s.adjusted(margins, stack.axes()).area())
        .collect();
    let area_at = |d: f64| {
        let i = slices
            .windows(2)
            .position(|w| d <= w[1].depth)
            .unwrap_or(slices.len().saturating_sub(2));
        let t = ((d - slices[i].depth) / (slices[i + 1].depth - slices[i].depth)).clamp(0.0, 1.0);
        lerp(areas[i], areas[i + 1], t)
    };
    if slices.len() < 2 {
        return 0.0;
    }
    stack
        .depth_samples(lo, hi)
        .windows(2)
        .map(|w| (w[1] - w[0]) * (area_at(w[0]) + area_at(w[1])) / 2.0)
        .sum()
}
