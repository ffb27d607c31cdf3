//! Human and machine readable summary of a region.

use std::fmt;

use serde::Serialize;

use crate::geometry::RegionGeometry;
use crate::margins::Margins;

/// Volumes and margins of a region at one revision.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    /// Region identifier.
    pub id: String,
    /// Persisted type identifier.
    pub kind: String,
    /// Category constraint, if any.
    pub constraint: Option<String>,
    /// Revision the numbers were taken at.
    pub revision: u64,
    /// Reference volume (nm³).
    pub total_volume: f64,
    /// Inclusion volume (nm³).
    pub inclusion_volume: f64,
    /// Exclusion volume (nm³).
    pub exclusion_volume: f64,
    /// Reference volume in voxels.
    pub total_voxels: f64,
    /// Inclusion volume in voxels.
    pub inclusion_voxels: f64,
    /// Exclusion volume in voxels.
    pub exclusion_voxels: f64,
    /// Current margins (nm).
    pub margins: Margins,
    /// Upper depth margin in slices.
    pub front_slices: f64,
    /// Lower depth margin in slices.
    pub back_slices: f64,
}

impl RegionGeometry {
    /// Summarize the current state.
    pub fn report(&self) -> RegionReport {
        let voxel: f64 = self.spacing().iter().product();
        let depth = self.policy().axes().depth;
        let total = self.total_volume();
        let inclusion = self.inclusion_volume();
        let exclusion = total - inclusion;
        let margins = self.margins();
        RegionReport {
            id: self.id().to_string(),
            kind: self.kind().type_id().to_string(),
            constraint: self.constraint().map(str::to_string),
            revision: self.revision(),
            total_volume: total,
            inclusion_volume: inclusion,
            exclusion_volume: exclusion,
            total_voxels: total / voxel,
            inclusion_voxels: inclusion / voxel,
            exclusion_voxels: exclusion / voxel,
            margins,
            front_slices: margins.inclusion(depth) / self.resolution(depth),
            back_slices: margins.exclusion(depth) / self.resolution(depth),
        }
    }
}

impl fmt::Display for RegionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.margins;
        writeln!(f, "Region {} ({})", self.id, self.kind)?;
        if let Some(c) = &self.constraint {
            writeln!(f, "  Constraint:       {c}")?;
        }
        writeln!(
            f,
            "  Total volume:     {:.0} voxels, {:.2} nm³",
            self.total_voxels, self.total_volume
        )?;
        writeln!(
            f,
            "  Inclusion volume: {:.0} voxels, {:.2} nm³",
            self.inclusion_voxels, self.inclusion_volume
        )?;
        writeln!(
            f,
            "  Exclusion volume: {:.0} voxels, {:.2} nm³",
            self.exclusion_voxels, self.exclusion_volume
        )?;
        writeln!(
            f,
            "  Inclusion margins: left {:.2}, top {:.2}, front {} slices",
            m.inclusion[0], m.inclusion[1], self.front_slices.round()
        )?;
        write!(
            f,
            "  Exclusion margins: right {:.2}, bottom {:.2}, back {} slices",
            m.exclusion[0], m.exclusion[1], self.back_slices.round()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_voxels() {
        let mut region =
            RegionGeometry::rectangular("7", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [2.0, 2.0, 2.5])
                .unwrap()
                .with_constraint("Synapse");
        assert!(region.set_margins([0.0, 0.0, 5.0], [0.0, 0.0, 2.5]));
        let report = region.report();
        assert!((report.total_voxels - 100_000.0 / 10.0).abs() < 1e-9);
        assert!((report.front_slices - 2.0).abs() < 1e-9);
        assert!((report.back_slices - 1.0).abs() < 1e-9);
        assert!((report.total_volume - report.inclusion_volume - report.exclusion_volume).abs() < 1e-9);

        let text = report.to_string();
        assert!(text.contains("Region 7 (RectangularBoundingRegion)"));
        assert!(text.contains("front 2 slices"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["constraint"], "Synapse");
    }
}
