//! Building-energy-certificate input record.
//!
//! An [`EnvelopeInput`] is the compact certificate data the whole pipeline
//! starts from. It is constructed once from external input (typically JSON),
//! validated immediately, and read-only afterward. Which geometry-solver
//! strategy applies is decided purely by which optional fields are present.

use crate::error::ValidationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Closed set of building types driving the heuristic window distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BuildingType {
    #[default]
    SingleFamily,
    MultiFamily,
    NonResidential,
}

/// Window areas per cardinal orientation in m2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationAreas {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl OrientationAreas {
    pub fn total(&self) -> f64 {
        self.north + self.east + self.south + self.west
    }
}

/// Building-certificate record.
///
/// Mandatory: net floor area, the four U-values and the floor count.
/// Everything else is optional and only widens what the solver can infer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeInput {
    /// Net (heated) floor area in m2.
    pub net_floor_area: f64,
    /// U-values in W/(m2*K).
    pub u_wall: f64,
    pub u_roof: f64,
    pub u_floor: f64,
    pub u_window: f64,
    pub floor_count: u32,
    /// Assumed storey height in m, used when no wall area pins the height.
    #[serde(default = "default_floor_height")]
    pub floor_height: f64,
    /// Individual envelope areas in m2, if the certificate lists them.
    pub wall_area: Option<f64>,
    pub roof_area: Option<f64>,
    pub floor_area: Option<f64>,
    /// Total envelope area in m2 (walls + roof + floor).
    pub envelope_area: Option<f64>,
    /// Gross (brutto) building volume in m3.
    pub gross_volume: Option<f64>,
    /// Window areas per orientation, if listed individually.
    pub window_areas: Option<OrientationAreas>,
    /// Single aggregate window-to-wall ratio, if no per-orientation areas.
    pub window_wall_ratio: Option<f64>,
    /// Infiltration rate in air changes per hour.
    #[serde(default = "default_infiltration")]
    pub infiltration_ach: f64,
    #[serde(default)]
    pub building_type: BuildingType,
    /// Footprint length/width hint.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,
}

fn default_floor_height() -> f64 {
    3.0
}

fn default_infiltration() -> f64 {
    0.5
}

fn default_aspect_ratio() -> f64 {
    1.5
}

const U_OPAQUE_MIN: f64 = 0.1;
const U_OPAQUE_MAX: f64 = 5.0;
const U_WINDOW_MIN: f64 = 0.4;
const U_WINDOW_MAX: f64 = 7.0;

impl EnvelopeInput {
    /// Loads and validates an input record from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input config: {}", path.display()))?;
        let input: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse input config: {}", path.display()))?;
        input.validate()?;
        Ok(input)
    }

    /// Checks all numeric ranges and internal consistency rules.
    ///
    /// Out-of-range values are errors, never silently clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.net_floor_area <= 10.0 || self.net_floor_area >= 50_000.0 {
            return Err(ValidationError::NetFloorArea(self.net_floor_area));
        }
        check_u_value("wall", self.u_wall, U_OPAQUE_MIN, U_OPAQUE_MAX)?;
        check_u_value("roof", self.u_roof, U_OPAQUE_MIN, U_OPAQUE_MAX)?;
        check_u_value("floor", self.u_floor, U_OPAQUE_MIN, U_OPAQUE_MAX)?;
        check_u_value("window", self.u_window, U_WINDOW_MIN, U_WINDOW_MAX)?;
        if self.floor_count < 1 || self.floor_count > 20 {
            return Err(ValidationError::FloorCount(self.floor_count));
        }
        if self.floor_height < 2.0 || self.floor_height > 6.0 {
            return Err(ValidationError::FloorHeight(self.floor_height));
        }
        if self.aspect_ratio <= 0.0 {
            return Err(ValidationError::NonPositive {
                field: "aspect_ratio",
                value: self.aspect_ratio,
            });
        }
        if self.infiltration_ach < 0.0 {
            return Err(ValidationError::NonPositive {
                field: "infiltration_ach",
                value: self.infiltration_ach,
            });
        }
        for (field, value) in [
            ("wall_area", self.wall_area),
            ("roof_area", self.roof_area),
            ("floor_area", self.floor_area),
            ("envelope_area", self.envelope_area),
            ("gross_volume", self.gross_volume),
        ] {
            if let Some(v) = value {
                if v <= 0.0 {
                    return Err(ValidationError::NonPositive { field, value: v });
                }
            }
        }

        // Roof and floor describe (roughly) the same footprint. A disagreement
        // above 50% means the record is internally inconsistent.
        if let (Some(roof), Some(floor)) = (self.roof_area, self.floor_area) {
            let deviation = (roof - floor).abs() / roof.max(floor);
            if deviation > 0.5 {
                return Err(ValidationError::EnvelopeAreaMismatch { roof, floor });
            }
        }

        if let Some(wwr) = self.window_wall_ratio {
            if !(0.02..=0.95).contains(&wwr) {
                return Err(ValidationError::WindowRatio(wwr));
            }
        }
        if let (Some(areas), Some(wall)) = (self.window_areas, self.wall_area) {
            let wwr = areas.total() / wall;
            if !(0.02..=0.95).contains(&wwr) {
                return Err(ValidationError::WindowRatio(wwr));
            }
        }

        let per_floor = self.net_floor_area / self.floor_count as f64;
        if per_floor < 10.0 {
            return Err(ValidationError::FootprintFloorMismatch {
                per_floor,
                floors: self.floor_count,
            });
        }

        Ok(())
    }
}

fn check_u_value(
    surface: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::UValue {
            surface,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn minimal_input() -> EnvelopeInput {
        EnvelopeInput {
            net_floor_area: 150.0,
            u_wall: 0.28,
            u_roof: 0.20,
            u_floor: 0.35,
            u_window: 1.3,
            floor_count: 2,
            floor_height: 3.0,
            wall_area: None,
            roof_area: None,
            floor_area: None,
            envelope_area: None,
            gross_volume: None,
            window_areas: None,
            window_wall_ratio: None,
            infiltration_ach: 0.5,
            building_type: BuildingType::SingleFamily,
            aspect_ratio: 1.3,
        }
    }

    #[test]
    fn test_minimal_input_is_valid() {
        assert!(minimal_input().validate().is_ok());
    }

    #[test]
    fn test_net_floor_area_bounds() {
        let mut input = minimal_input();
        input.net_floor_area = 5.0;
        assert!(matches!(
            input.validate(),
            Err(ValidationError::NetFloorArea(_))
        ));
        input.net_floor_area = 60_000.0;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_u_value_bounds() {
        let mut input = minimal_input();
        input.u_wall = 9.0;
        assert!(matches!(
            input.validate(),
            Err(ValidationError::UValue { surface: "wall", .. })
        ));
    }

    #[test]
    fn test_floor_count_bounds() {
        let mut input = minimal_input();
        input.floor_count = 0;
        assert!(matches!(
            input.validate(),
            Err(ValidationError::FloorCount(0))
        ));
        input.floor_count = 21;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_roof_floor_mismatch() {
        let mut input = minimal_input();
        input.roof_area = Some(200.0);
        input.floor_area = Some(80.0);
        assert!(matches!(
            input.validate(),
            Err(ValidationError::EnvelopeAreaMismatch { .. })
        ));
    }

    #[test]
    fn test_implied_window_ratio_bounds() {
        let mut input = minimal_input();
        input.wall_area = Some(200.0);
        input.window_areas = Some(OrientationAreas {
            north: 0.5,
            east: 0.5,
            south: 1.0,
            west: 0.5,
        });
        // 2.5 / 200 = 1.25% < 2%
        assert!(matches!(
            input.validate(),
            Err(ValidationError::WindowRatio(_))
        ));
    }

    #[test]
    fn test_footprint_floor_mismatch() {
        let mut input = minimal_input();
        input.net_floor_area = 40.0;
        input.floor_count = 8;
        assert!(matches!(
            input.validate(),
            Err(ValidationError::FootprintFloorMismatch { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_defaults() {
        let json = r#"{
            "net_floor_area": 120.0,
            "u_wall": 0.3, "u_roof": 0.2, "u_floor": 0.4, "u_window": 1.1,
            "floor_count": 1
        }"#;
        let input: EnvelopeInput = serde_json::from_str(json).unwrap();
        assert!((input.floor_height - 3.0).abs() < 1e-12);
        assert!((input.infiltration_ach - 0.5).abs() < 1e-12);
        assert_eq!(input.building_type, BuildingType::SingleFamily);
        assert!(input.validate().is_ok());
    }
}
