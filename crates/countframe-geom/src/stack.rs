//! Per-slice boundary outlines and the stack they form along the depth axis.

use countframe_math::{lerp, AxisPermutation, Point2};

use crate::error::{RegionError, Result};
use crate::margins::{Margins, Side};

/// Corner of a slice outline, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Near horizontal, far vertical.
    LeftBottom,
    /// Near horizontal, near vertical.
    LeftTop,
    /// Far horizontal, near vertical.
    RightTop,
    /// Far horizontal, far vertical.
    RightBottom,
}

impl Corner {
    /// Corners in the order they are stored.
    pub const ALL: [Corner; 4] = [
        Corner::LeftBottom,
        Corner::LeftTop,
        Corner::RightTop,
        Corner::RightBottom,
    ];

    /// Storage index.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which in-plane axis of a stack an offset or span refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InPlane {
    /// The stack's horizontal axis.
    Horizontal,
    /// The stack's vertical axis.
    Vertical,
}

/// Four-point outline of the counted content on one depth slice.
///
/// Points are in-plane `(horizontal, vertical)` coordinates; the vertical
/// axis grows from top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceBoundary {
    /// Position of the slice along the depth axis.
    pub depth: f64,
    /// Corners indexed by [`Corner::index`].
    pub corners: [Point2; 4],
}

impl SliceBoundary {
    /// Create an outline from corners in storage order.
    pub fn new(depth: f64, corners: [Point2; 4]) -> Self {
        Self { depth, corners }
    }

    /// Create an outline from a point list, which must hold exactly 4 points.
    pub fn from_points(depth: f64, points: &[Point2]) -> Result<Self> {
        let corners: [Point2; 4] = points.try_into().map_err(|_| {
            RegionError::MalformedBoundary(format!(
                "slice at depth {depth} has {} points, expected 4",
                points.len()
            ))
        })?;
        Ok(Self::new(depth, corners))
    }

    /// Axis-aligned rectangular outline.
    pub fn rect(depth: f64, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self::new(
            depth,
            [
                Point2::new(left, bottom),
                Point2::new(left, top),
                Point2::new(right, top),
                Point2::new(right, bottom),
            ],
        )
    }

    /// One corner.
    pub fn corner(&self, c: Corner) -> Point2 {
        self.corners[c.index()]
    }

    /// Outline shifted inwards by the in-plane margins of `axes`.
    pub fn adjusted(&self, margins: &Margins, axes: &AxisPermutation) -> Self {
        let inc_h = margins.inclusion(axes.horizontal);
        let exc_h = margins.exclusion(axes.horizontal);
        let inc_v = margins.inclusion(axes.vertical);
        let exc_v = margins.exclusion(axes.vertical);

        let mut corners = self.corners;
        for c in Corner::ALL {
            let p = &mut corners[c.index()];
            match c {
                Corner::LeftBottom | Corner::LeftTop => p.x += inc_h,
                Corner::RightTop | Corner::RightBottom => p.x -= exc_h,
            }
            match c {
                Corner::LeftTop | Corner::RightTop => p.y += inc_v,
                Corner::LeftBottom | Corner::RightBottom => p.y -= exc_v,
            }
        }
        Self::new(self.depth, corners)
    }

    /// Signed shoelace area; positive while the outline is not inverted.
    pub fn signed_area(&self) -> f64 {
        let mut area = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            area += self.corners[i].x * self.corners[j].y;
            area -= self.corners[j].x * self.corners[i].y;
        }
        area / 2.0
    }

    /// Enclosed area, zero once opposite edges have crossed.
    pub fn area(&self) -> f64 {
        self.signed_area().max(0.0)
    }

    /// Innermost `(near, far)` positions along one in-plane axis.
    ///
    /// For a slanted edge the corner closest to the interior wins, so the
    /// pair bounds the region on every row of the slice.
    pub fn inscribed(&self, axis: InPlane) -> (f64, f64) {
        let c = |corner: Corner| self.corner(corner);
        match axis {
            InPlane::Horizontal => (
                c(Corner::LeftBottom).x.max(c(Corner::LeftTop).x),
                c(Corner::RightTop).x.min(c(Corner::RightBottom).x),
            ),
            InPlane::Vertical => (
                c(Corner::LeftTop).y.max(c(Corner::RightTop).y),
                c(Corner::LeftBottom).y.min(c(Corner::RightBottom).y),
            ),
        }
    }

    /// Outermost `(min, max)` positions along one in-plane axis.
    pub fn extent(&self, axis: InPlane) -> (f64, f64) {
        let values = self.corners.iter().map(|p| match axis {
            InPlane::Horizontal => p.x,
            InPlane::Vertical => p.y,
        });
        values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    }

    /// Positions of the two edges crossing the line `axis = coord`.
    ///
    /// Crossing a horizontal coordinate returns the `(top, bottom)` positions
    /// along the vertical axis; crossing a vertical coordinate returns
    /// `(left, right)` along the horizontal axis.
    pub fn span_at(&self, axis: InPlane, coord: f64) -> (f64, f64) {
        let c = |corner: Corner| self.corner(corner);
        match axis {
            InPlane::Horizontal => (
                edge_at(c(Corner::LeftTop), c(Corner::RightTop), coord, InPlane::Horizontal),
                edge_at(c(Corner::LeftBottom), c(Corner::RightBottom), coord, InPlane::Horizontal),
            ),
            InPlane::Vertical => (
                edge_at(c(Corner::LeftTop), c(Corner::LeftBottom), coord, InPlane::Vertical),
                edge_at(c(Corner::RightTop), c(Corner::RightBottom), coord, InPlane::Vertical),
            ),
        }
    }

    /// Point of the edge on `side` of `axis` crossing the line at `coord`.
    pub fn edge_point(&self, axis: InPlane, side: Side, coord: f64) -> Point2 {
        let (near, far) = self.span_at(axis, coord);
        let other = match side {
            Side::Near => near,
            Side::Far => far,
        };
        match axis {
            InPlane::Horizontal => Point2::new(coord, other),
            InPlane::Vertical => Point2::new(other, coord),
        }
    }

    /// Whether `p` lies inside the outline.
    ///
    /// Near edges are inclusive. Far edges are inclusive only when
    /// `far_inclusive` is set.
    pub fn contains(&self, p: &Point2, far_inclusive: bool) -> bool {
        let (left, right) = self.span_at(InPlane::Vertical, p.y);
        let (top, bottom) = self.span_at(InPlane::Horizontal, p.x);
        let below_far = |v: f64, far: f64| if far_inclusive { v <= far } else { v < far };
        p.x >= left && below_far(p.x, right) && p.y >= top && below_far(p.y, bottom)
    }

    /// Corner-wise interpolation towards `other`.
    pub fn lerp(&self, other: &SliceBoundary, t: f64) -> Self {
        let mut corners = self.corners;
        for (i, p) in corners.iter_mut().enumerate() {
            let q = other.corners[i];
            *p = Point2::new(lerp(p.x, q.x, t), lerp(p.y, q.y, t));
        }
        Self::new(lerp(self.depth, other.depth, t), corners)
    }
}

/// Position along the non-`axis` coordinate of segment `a`-`b` where the
/// `axis` coordinate equals `coord`, clamped to the segment.
fn edge_at(a: Point2, b: Point2, coord: f64, axis: InPlane) -> f64 {
    let (a_on, b_on, a_off, b_off) = match axis {
        InPlane::Horizontal => (a.x, b.x, a.y, b.y),
        InPlane::Vertical => (a.y, b.y, a.x, b.x),
    };
    let span = b_on - a_on;
    if span.abs() < 1e-12 {
        return (a_off + b_off) / 2.0;
    }
    let t = ((coord - a_on) / span).clamp(0.0, 1.0);
    lerp(a_off, b_off, t)
}

/// Slice outlines ordered along the depth axis of `axes`.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceStack {
    axes: AxisPermutation,
    slices: Vec<SliceBoundary>,
}

impl SliceStack {
    /// Build a stack, checking axis roles and depth order.
    ///
    /// An empty list is accepted and stands for outline data that is not
    /// available yet. A single slice cannot form an interval and is rejected.
    pub fn new(axes: AxisPermutation, slices: Vec<SliceBoundary>) -> Result<Self> {
        if AxisPermutation::new(axes.horizontal, axes.vertical, axes.depth).is_none() {
            return Err(RegionError::MalformedBoundary(format!(
                "axis roles {axes:?} use an axis twice"
            )));
        }
        if slices.len() == 1 {
            return Err(RegionError::MalformedBoundary(
                "a stack needs at least two slices".into(),
            ));
        }
        if let Some(bad) = slices.iter().find(|s| {
            !s.depth.is_finite() || s.corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite())
        }) {
            return Err(RegionError::MalformedBoundary(format!(
                "slice at depth {} has non-finite coordinates",
                bad.depth
            )));
        }
        for pair in slices.windows(2) {
            if pair[1].depth <= pair[0].depth {
                return Err(RegionError::MalformedBoundary(format!(
                    "slice depths must increase strictly ({} then {})",
                    pair[0].depth, pair[1].depth
                )));
            }
        }
        Ok(Self { axes, slices })
    }

    /// A stack with no outline data.
    pub fn empty(axes: AxisPermutation) -> Self {
        Self {
            axes,
            slices: Vec::new(),
        }
    }

    /// Axis roles of the stack.
    pub fn axes(&self) -> &AxisPermutation {
        &self.axes
    }

    /// All slices in depth order.
    pub fn slices(&self) -> &[SliceBoundary] {
        &self.slices
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// True when no outline data is present.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Depth of the first and last slice.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        Some((self.slices.first()?.depth, self.slices.last()?.depth))
    }

    /// Depth interval left after applying the depth margins.
    pub fn adjusted_depth_range(&self, margins: &Margins) -> Option<(f64, f64)> {
        let (first, last) = self.depth_range()?;
        let d = self.axes.depth;
        Some((first + margins.inclusion(d), last - margins.exclusion(d)))
    }

    /// Indices of the upper and lower slices bounding the depth-adjusted
    /// region.
    ///
    /// The upper index is the last slice at or above `first + upper margin`,
    /// the lower index the first slice at or below `last - lower margin`.
    /// When both land on the same slice the upper index moves up by one (or
    /// the lower one down, at the top of the stack) so one interval remains.
    pub fn bounding_indices(&self, margins: &Margins) -> Option<(usize, usize)> {
        let (upper_pos, lower_pos) = self.adjusted_depth_range(margins)?;
        let n = self.slices.len();
        let mut upper = self
            .slices
            .iter()
            .rposition(|s| s.depth <= upper_pos)
            .unwrap_or(0);
        let mut lower = self
            .slices
            .iter()
            .position(|s| s.depth >= lower_pos)
            .unwrap_or(n - 1);
        if upper >= lower {
            if lower > 0 {
                upper = lower - 1;
            } else {
                upper = 0;
                lower = 1;
            }
        }
        Some((upper, lower))
    }

    /// Outline at an arbitrary depth, interpolated between neighbours.
    ///
    /// Returns `None` outside the stack.
    pub fn boundary_at(&self, depth: f64) -> Option<SliceBoundary> {
        let (first, last) = self.depth_range()?;
        if depth < first || depth > last {
            return None;
        }
        let i = self
            .slices
            .windows(2)
            .position(|w| depth <= w[1].depth)?;
        let (a, b) = (&self.slices[i], &self.slices[i + 1]);
        let t = (depth - a.depth) / (b.depth - a.depth);
        Some(a.lerp(b, t))
    }

    /// Depths at which the region between `lo` and `hi` changes shape: both
    /// ends plus every slice strictly between them.
    pub fn depth_samples(&self, lo: f64, hi: f64) -> Vec<f64> {
        let mut out = vec![lo];
        out.extend(
            self.slices
                .iter()
                .map(|s| s.depth)
                .filter(|&d| d > lo && d < hi),
        );
        if hi > lo {
            out.push(hi);
        }
        out
    }
}
