//! Content outlines detected from an 8-bit image stack.
//!
//! Each slice is scanned row by row for the first and last pixel brighter
//! than a threshold; the rectangle enclosing those pixels becomes the slice
//! outline. Slices without content are left out.

use countframe_math::AxisPermutation;
use tracing::debug;

use crate::error::{RegionError, Result};
use crate::policy::MarginExtension;
use crate::stack::SliceBoundary;

/// Dense 8-bit voxel grid, x fastest then y then z.
#[derive(Debug, Clone)]
pub struct ImageStack {
    dims: [usize; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    data: Vec<u8>,
}

impl ImageStack {
    /// Wrap voxel data, checking it matches `dims`.
    pub fn new(dims: [usize; 3], spacing: [f64; 3], data: Vec<u8>) -> Result<Self> {
        let expected = dims.iter().product();
        if data.len() != expected {
            return Err(RegionError::ImageSize {
                expected,
                actual: data.len(),
            });
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RegionError::InvalidSpacing(spacing));
        }
        Ok(Self {
            dims,
            spacing,
            origin: [0.0; 3],
            data,
        })
    }

    /// Build a stack by evaluating `f(x, y, z)` for every voxel.
    pub fn from_fn(
        dims: [usize; 3],
        spacing: [f64; 3],
        mut f: impl FnMut(usize, usize, usize) -> u8,
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(dims.iter().product());
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(dims, spacing, data)
    }

    /// Move the stack to a world origin (nm).
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Grid dimensions.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Voxel spacing (nm).
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// World box covered by the voxels, `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn bounds(&self) -> [f64; 6] {
        let mut out = [0.0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.origin[axis];
            out[2 * axis + 1] = self.origin[axis] + self.dims[axis] as f64 * self.spacing[axis];
        }
        out
    }

    /// Value of one voxel.
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[(z * self.dims[1] + y) * self.dims[0] + x]
    }

    fn row(&self, y: usize, z: usize) -> &[u8] {
        let start = (z * self.dims[1] + y) * self.dims[0];
        &self.data[start..start + self.dims[0]]
    }
}

/// Outlines found by [`StackBorders::detect`].
#[derive(Debug, Clone)]
pub struct StackBorders {
    spacing: [f64; 3],
    slices: Vec<SliceBoundary>,
}

impl StackBorders {
    /// Scan every slice of `stack` for content brighter than `threshold`.
    pub fn detect(stack: &ImageStack, threshold: u8) -> Self {
        let [_, height, depth] = stack.dims;
        let [sx, sy, sz] = stack.spacing;
        let [ox, oy, oz] = stack.origin;

        let mut slices = Vec::new();
        for z in 0..depth {
            let mut left = usize::MAX;
            let mut right = 0;
            let mut top = usize::MAX;
            let mut bottom = 0;
            for y in 0..height {
                let row = stack.row(y, z);
                let first = row.iter().position(|&v| v > threshold);
                let last = row.iter().rposition(|&v| v > threshold);
                if let (Some(first), Some(last)) = (first, last) {
                    left = left.min(first);
                    right = right.max(last);
                    top = top.min(y);
                    bottom = bottom.max(y);
                }
            }
            if left == usize::MAX {
                continue;
            }
            slices.push(SliceBoundary::rect(
                oz + z as f64 * sz,
                ox + left as f64 * sx,
                ox + (right + 1) as f64 * sx,
                oy + top as f64 * sy,
                oy + (bottom + 1) as f64 * sy,
            ));
        }
        debug!(slices = slices.len(), depth, threshold, "detected stack borders");
        Self {
            spacing: stack.spacing,
            slices,
        }
    }

    /// Detected outlines.
    pub fn slices(&self) -> &[SliceBoundary] {
        &self.slices
    }
}

impl MarginExtension for StackBorders {
    fn slice_outlines(&self) -> Result<Option<Vec<SliceBoundary>>> {
        if self.slices.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.slices.clone()))
        }
    }

    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    fn axes(&self) -> AxisPermutation {
        AxisPermutation::IDENTITY
    }
}
