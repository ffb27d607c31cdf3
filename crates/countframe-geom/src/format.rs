//! Single-line persisted form of a region.
//!
//! ```text
//! RectangularBoundingRegion=10.00,5.00,0.00,20.00,15.00,0.00
//! ```
//!
//! Values are left, top, upper, right, bottom, lower with two fractional
//! digits.

use std::fmt;
use std::str::FromStr;

use countframe_math::Axis;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::geometry::RegionGeometry;
use crate::margins::Margins;

/// Type identifier of rectangular regions.
pub const RECTANGULAR_ID: &str = "RectangularBoundingRegion";
/// Type identifier of adaptive regions.
pub const ADAPTIVE_ID: &str = "AdaptiveBoundingRegion";

const LEGACY_RECTANGULAR_ID: &str = "RectangularCountingFrame";
const LEGACY_ADAPTIVE_ID: &str = "AdaptiveCountingFrame";

/// Persisted region type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// Fixed box.
    Rectangular,
    /// Per-slice outline.
    Adaptive,
}

impl RegionKind {
    /// Identifier written before the `=`.
    pub fn type_id(self) -> &'static str {
        match self {
            RegionKind::Rectangular => RECTANGULAR_ID,
            RegionKind::Adaptive => ADAPTIVE_ID,
        }
    }

    /// Parse an identifier, accepting the older counting-frame names.
    pub fn from_type_id(id: &str) -> Option<Self> {
        match id {
            RECTANGULAR_ID | LEGACY_RECTANGULAR_ID => Some(RegionKind::Rectangular),
            ADAPTIVE_ID | LEGACY_ADAPTIVE_ID => Some(RegionKind::Adaptive),
            _ => None,
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_id())
    }
}

/// A parsed region line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLine {
    /// Region type.
    pub kind: RegionKind,
    /// Margins as stored (already rounded to two digits).
    pub margins: Margins,
}

impl RegionLine {
    /// Capture the persisted state of a region.
    pub fn of(region: &RegionGeometry) -> Self {
        Self {
            kind: region.kind(),
            margins: region.margins(),
        }
    }
}

impl fmt::Display for RegionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.margins;
        write!(f, "{}=", self.kind.type_id())?;
        let values = Axis::ALL
            .iter()
            .map(|&a| m.inclusion(a))
            .chain(Axis::ALL.iter().map(|&a| m.exclusion(a)));
        for (i, v) in values.enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v:.2}")?;
        }
        Ok(())
    }
}

impl FromStr for RegionLine {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, values) = s.trim().split_once('=').ok_or(FormatError::MissingSeparator)?;
        let kind = RegionKind::from_type_id(id.trim())
            .ok_or_else(|| FormatError::UnknownType(id.trim().to_string()))?;

        let fields: Vec<&str> = values.split(',').map(str::trim).collect();
        if fields.len() != 6 {
            return Err(FormatError::FieldCount(fields.len()));
        }
        let mut numbers = [0.0; 6];
        for (index, text) in fields.iter().enumerate() {
            numbers[index] = text.parse().map_err(|_| FormatError::InvalidNumber {
                index,
                text: text.to_string(),
            })?;
        }

        let margins = Margins::new(
            [numbers[0], numbers[1], numbers[2]],
            [numbers[3], numbers[4], numbers[5]],
        );
        margins.check_values()?;
        Ok(Self { kind, margins })
    }
}

/// Serialize a region to its persisted line.
pub fn serialize(region: &RegionGeometry) -> String {
    RegionLine::of(region).to_string()
}

/// Parse a persisted line.
pub fn parse(line: &str) -> Result<RegionLine, FormatError> {
    line.parse()
}
