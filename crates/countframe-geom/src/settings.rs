//! Tunables shared by widgets, border detection and the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegionError, Result};
use crate::format::RegionKind;
use crate::margins::Margins;

/// Region editing and detection parameters.
///
/// Every field has a default, so a settings file only needs the values it
/// changes:
///
/// ```toml
/// hover_tolerance = 4.0
///
/// [default_margins]
/// inclusion = [10.0, 10.0, 0.0]
/// exclusion = [10.0, 10.0, 0.0]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Distance (in view units) within which the pointer hovers an edge.
    pub hover_tolerance: f64,
    /// Pixels brighter than this count as content during border detection.
    pub border_threshold: u8,
    /// Voxel spacing used when the input does not provide one (nm).
    pub spacing: [f64; 3],
    /// Margins applied to newly created regions.
    pub default_margins: Margins,
    /// Policy used for new regions.
    pub default_kind: RegionKind,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            hover_tolerance: 5.0,
            border_threshold: 10,
            spacing: [1.0, 1.0, 1.0],
            default_margins: Margins::ZERO,
            default_kind: RegionKind::Rectangular,
        }
    }
}

impl RegionSettings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.hover_tolerance.is_finite() || self.hover_tolerance <= 0.0 {
            return Err(RegionError::InvalidSettings(
                "hover_tolerance must be positive".into(),
            ));
        }
        if self.spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RegionError::InvalidSettings(
                "spacing must be positive on every axis".into(),
            ));
        }
        self.default_margins
            .check_values()
            .map_err(|e| RegionError::InvalidSettings(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RegionSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let settings = RegionSettings::from_toml_str(
            r#"
            hover_tolerance = 2.5
            default_kind = "Adaptive"

            [default_margins]
            inclusion = [1.0, 2.0, 0.0]
            exclusion = [3.0, 4.0, 0.0]
            "#,
        )
        .unwrap();
        assert_eq!(settings.hover_tolerance, 2.5);
        assert_eq!(settings.border_threshold, 10);
        assert_eq!(settings.default_kind, RegionKind::Adaptive);
        assert_eq!(settings.default_margins.exclusion, [3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = RegionSettings {
            hover_tolerance: -1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(RegionSettings::from_toml_str("spacing = [1.0, 0.0, 1.0]").is_err());
        assert!(matches!(
            RegionSettings::from_toml_str("hover_tolerance = \"wide\""),
            Err(RegionError::Config(_))
        ));
    }
}
