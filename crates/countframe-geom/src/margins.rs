//! Inclusion and exclusion offsets.

use countframe_math::Axis;
use serde::{Deserialize, Serialize};

use crate::error::MarginViolation;

/// Which of the two opposite boundaries along an axis a margin belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left, top or upper boundary. Offsets here are inclusion margins.
    Near,
    /// Right, bottom or lower boundary. Offsets here are exclusion margins.
    Far,
}

/// Six non-negative offsets (nm), one inclusion/exclusion pair per axis.
///
/// `inclusion` holds left, top, upper and `exclusion` holds right, bottom,
/// lower, both indexed by [`Axis::index`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    /// Offsets of the near (inclusion) boundaries.
    pub inclusion: [f64; 3],
    /// Offsets of the far (exclusion) boundaries.
    pub exclusion: [f64; 3],
}

impl Margins {
    /// All offsets zero.
    pub const ZERO: Self = Self {
        inclusion: [0.0; 3],
        exclusion: [0.0; 3],
    };

    /// Create margins from the two offset triples.
    pub fn new(inclusion: [f64; 3], exclusion: [f64; 3]) -> Self {
        Self {
            inclusion,
            exclusion,
        }
    }

    /// Offset of one boundary.
    pub fn get(&self, axis: Axis, side: Side) -> f64 {
        match side {
            Side::Near => self.inclusion[axis.index()],
            Side::Far => self.exclusion[axis.index()],
        }
    }

    /// Replace the offset of one boundary.
    pub fn set(&mut self, axis: Axis, side: Side, value: f64) {
        match side {
            Side::Near => self.inclusion[axis.index()] = value,
            Side::Far => self.exclusion[axis.index()] = value,
        }
    }

    /// Inclusion offset along `axis`.
    pub fn inclusion(&self, axis: Axis) -> f64 {
        self.inclusion[axis.index()]
    }

    /// Exclusion offset along `axis`.
    pub fn exclusion(&self, axis: Axis) -> f64 {
        self.exclusion[axis.index()]
    }

    /// Check every offset is finite and non-negative.
    pub fn check_values(&self) -> Result<(), MarginViolation> {
        for axis in Axis::ALL {
            for value in [self.inclusion(axis), self.exclusion(axis)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(MarginViolation::InvalidValue { axis, value });
                }
            }
        }
        Ok(())
    }

    /// Copy with negative offsets raised to zero.
    pub fn clamped(&self) -> Self {
        Self {
            inclusion: self.inclusion.map(|v| v.max(0.0)),
            exclusion: self.exclusion.map(|v| v.max(0.0)),
        }
    }

    /// Copy rounded to the two fractional digits used when persisting.
    pub fn rounded(&self) -> Self {
        Self {
            inclusion: self.inclusion.map(round_hundredths),
            exclusion: self.exclusion.map(round_hundredths),
        }
    }
}

/// Round through the persisted decimal text so the result matches a reparse.
fn round_hundredths(v: f64) -> f64 {
    format!("{v:.2}").parse().unwrap_or(v)
}
