//! Reference boundaries that margins are offset from.

use std::borrow::Cow;

use countframe_math::{Aabb3, AxisPermutation, Point2};
use serde::{Deserialize, Serialize};

use crate::borders::{ImageStack, StackBorders};
use crate::error::Result;
use crate::format::RegionKind;
use crate::stack::{SliceBoundary, SliceStack};

/// Supplies per-slice content outlines for adaptive regions.
///
/// Implemented by whatever computes the outlines of a channel, such as
/// [`StackBorders`](crate::StackBorders).
pub trait MarginExtension {
    /// Outline of every depth slice in depth order, or `None` while the
    /// outlines have not been computed.
    ///
    /// Outline data that exists but is not usable is an error.
    fn slice_outlines(&self) -> Result<Option<Vec<SliceBoundary>>>;

    /// Voxel spacing of the channel (nm per voxel along x, y, z).
    fn spacing(&self) -> [f64; 3];

    /// Axis roles of the outlines.
    fn axes(&self) -> AxisPermutation {
        AxisPermutation::IDENTITY
    }
}

/// Serializable outline list, the on-disk form of a margin extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineSet {
    /// Axis roles, identity when omitted.
    #[serde(default)]
    pub axes: AxisPermutation,
    /// Voxel spacing (nm).
    pub spacing: [f64; 3],
    /// One entry per slice.
    pub slices: Vec<OutlineRecord>,
}

/// One serialized slice outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRecord {
    /// Depth of the slice.
    pub depth: f64,
    /// Corner points as `[horizontal, vertical]` pairs, left-bottom first.
    pub points: Vec<[f64; 2]>,
}

impl OutlineSet {
    /// Capture the outlines of any extension.
    pub fn from_extension(ext: &dyn MarginExtension) -> Result<Self> {
        let slices = ext
            .slice_outlines()?
            .unwrap_or_default()
            .into_iter()
            .map(|s| OutlineRecord {
                depth: s.depth,
                points: s.corners.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();
        Ok(Self {
            axes: ext.axes(),
            spacing: ext.spacing(),
            slices,
        })
    }

    /// Convert the records into checked outlines.
    pub fn boundaries(&self) -> Result<Vec<SliceBoundary>> {
        self.slices
            .iter()
            .map(|r| {
                let points: Vec<Point2> = r.points.iter().map(|p| Point2::new(p[0], p[1])).collect();
                SliceBoundary::from_points(r.depth, &points)
            })
            .collect()
    }
}

impl MarginExtension for OutlineSet {
    fn slice_outlines(&self) -> Result<Option<Vec<SliceBoundary>>> {
        if self.slices.is_empty() {
            return Ok(None);
        }
        self.boundaries().map(Some)
    }

    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    fn axes(&self) -> AxisPermutation {
        self.axes
    }
}

/// How the reference boundary of a region is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum MarginPolicy {
    /// Fixed box, identical on every slice.
    Rectangular {
        /// The box, set once at creation.
        bounds: Aabb3,
    },
    /// Outline that follows the image content slice by slice.
    Adaptive {
        /// The outlines; empty while no data is available.
        stack: SliceStack,
    },
}

impl MarginPolicy {
    /// Rectangular policy from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn rectangular(bounds: [f64; 6]) -> Self {
        MarginPolicy::Rectangular {
            bounds: Aabb3::from_bounds(bounds),
        }
    }

    /// Adaptive policy from the outlines of an extension.
    ///
    /// Missing outlines give an empty stack; malformed ones are an error.
    pub fn adaptive(ext: &dyn MarginExtension) -> Result<Self> {
        let slices = ext.slice_outlines()?.unwrap_or_default();
        Ok(MarginPolicy::Adaptive {
            stack: SliceStack::new(ext.axes(), slices)?,
        })
    }

    /// Policy of `kind` for a region over a whole image stack.
    ///
    /// A rectangular policy covers every voxel; an adaptive one follows the
    /// content detected above `threshold`.
    pub fn for_image(image: &ImageStack, kind: RegionKind, threshold: u8) -> Result<Self> {
        match kind {
            RegionKind::Rectangular => Ok(Self::rectangular(image.bounds())),
            RegionKind::Adaptive => Self::adaptive(&StackBorders::detect(image, threshold)),
        }
    }

    /// Persisted type of this policy.
    pub fn kind(&self) -> RegionKind {
        match self {
            MarginPolicy::Rectangular { .. } => RegionKind::Rectangular,
            MarginPolicy::Adaptive { .. } => RegionKind::Adaptive,
        }
    }

    /// Axis roles of the reference boundary.
    pub fn axes(&self) -> AxisPermutation {
        match self {
            MarginPolicy::Rectangular { .. } => AxisPermutation::IDENTITY,
            MarginPolicy::Adaptive { stack } => *stack.axes(),
        }
    }

    /// Reference boundary as a slice stack.
    ///
    /// A rectangle becomes two identical slices at its depth extremes.
    pub fn reference_stack(&self) -> Cow<'_, SliceStack> {
        match self {
            MarginPolicy::Rectangular { bounds } => {
                let axes = AxisPermutation::IDENTITY;
                let (left, right) = bounds.range(axes.horizontal);
                let (top, bottom) = bounds.range(axes.vertical);
                let (upper, lower) = bounds.range(axes.depth);
                let slices = vec![
                    SliceBoundary::rect(upper, left, right, top, bottom),
                    SliceBoundary::rect(lower, left, right, top, bottom),
                ];
                // a flat box has no interval to stack
                Cow::Owned(SliceStack::new(axes, slices).unwrap_or_else(|_| SliceStack::empty(axes)))
            }
            MarginPolicy::Adaptive { stack } => Cow::Borrowed(stack),
        }
    }

    /// Box enclosing the whole reference boundary, `None` without data.
    pub fn bounds(&self) -> Option<Aabb3> {
        match self {
            MarginPolicy::Rectangular { bounds } => Some(*bounds),
            MarginPolicy::Adaptive { stack } => {
                if stack.is_empty() {
                    return None;
                }
                let axes = stack.axes();
                let points: Vec<_> = stack
                    .slices()
                    .iter()
                    .flat_map(|s| s.corners.iter().map(move |p| axes.lift(p, s.depth)))
                    .collect();
                Some(Aabb3::from_points(&points))
            }
        }
    }

    /// True when there is no reference boundary to work with.
    pub fn is_empty(&self) -> bool {
        match self {
            MarginPolicy::Rectangular { bounds } => bounds.is_empty(),
            MarginPolicy::Adaptive { stack } => stack.is_empty(),
        }
    }
}
