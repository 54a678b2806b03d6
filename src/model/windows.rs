//! Window-to-wall ratio distribution per facade orientation.

use crate::input::{BuildingType, EnvelopeInput};
use crate::model::Orientation;
use crate::model::limits::WWR_CLAMP;
use crate::model::solver::GeometrySolution;

/// Window-to-wall ratio per cardinal orientation, each in [0, 0.95].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationRatios {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl OrientationRatios {
    pub fn get(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::North => self.north,
            Orientation::East => self.east,
            Orientation::South => self.south,
            Orientation::West => self.west,
        }
    }

    pub fn average(&self) -> f64 {
        0.25 * (self.north + self.east + self.south + self.west)
    }

    pub fn sum(&self) -> f64 {
        self.north + self.east + self.south + self.west
    }
}

/// Per-building-type orientation weights for the heuristic branch.
///
/// Each vector sums to 1.0 and is biased toward south, where residential
/// buildings concentrate their glazing.
fn orientation_weights(building_type: BuildingType) -> [f64; 4] {
    // [north, east, south, west]
    match building_type {
        BuildingType::SingleFamily => [0.15, 0.20, 0.40, 0.25],
        BuildingType::MultiFamily => [0.20, 0.225, 0.35, 0.225],
        BuildingType::NonResidential => [0.22, 0.24, 0.30, 0.24],
    }
}

/// Estimated exterior wall area of one facade, assuming rectangular massing.
fn facade_area(solution: &GeometrySolution, orientation: Orientation) -> f64 {
    let edge = match orientation {
        Orientation::North | Orientation::South => solution.length,
        Orientation::East | Orientation::West => solution.width,
    };
    edge * solution.height
}

/// Ratios from supplied per-orientation window areas.
pub fn from_areas(
    areas: &crate::input::OrientationAreas,
    solution: &GeometrySolution,
) -> OrientationRatios {
    let ratio = |area: f64, orientation: Orientation| {
        (area / facade_area(solution, orientation)).min(WWR_CLAMP)
    };
    OrientationRatios {
        north: ratio(areas.north, Orientation::North),
        east: ratio(areas.east, Orientation::East),
        south: ratio(areas.south, Orientation::South),
        west: ratio(areas.west, Orientation::West),
    }
}

/// Ratios from a single aggregate WWR and a building-type weight vector.
///
/// The per-orientation ratios scale linearly with the aggregate and sum to
/// it exactly (weights sum to 1.0).
pub fn from_aggregate(wwr: f64, building_type: BuildingType) -> OrientationRatios {
    let [n, e, s, w] = orientation_weights(building_type);
    OrientationRatios {
        north: (wwr * n).min(WWR_CLAMP),
        east: (wwr * e).min(WWR_CLAMP),
        south: (wwr * s).min(WWR_CLAMP),
        west: (wwr * w).min(WWR_CLAMP),
    }
}

/// Fallback aggregate WWR when the certificate lists no window data.
pub const DEFAULT_AGGREGATE_WWR: f64 = 0.30;

/// Picks the distribution branch matching the available input.
pub fn distribute(input: &EnvelopeInput, solution: &GeometrySolution) -> OrientationRatios {
    match (&input.window_areas, input.window_wall_ratio) {
        (Some(areas), _) => from_areas(areas, solution),
        (None, Some(wwr)) => from_aggregate(wwr, input.building_type),
        (None, None) => from_aggregate(DEFAULT_AGGREGATE_WWR, input.building_type),
    }
}
