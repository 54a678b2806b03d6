//! Error taxonomy for the geometry and model-emission pipeline.
//!
//! Validation and geometry errors are fatal and propagate to the caller.
//! External-engine failures are never represented here; they are captured
//! as values in [`crate::run::RunOutcome`] so batch runs can continue.

use thiserror::Error;

/// Fatal input errors raised at `EnvelopeInput` validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("net floor area {0:.1} m2 outside the accepted range (10, 50000)")]
    NetFloorArea(f64),

    #[error("{surface} U-value {value:.2} W/(m2*K) outside [{min}, {max}]")]
    UValue {
        surface: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("floor count {0} outside the accepted range 1..=20")]
    FloorCount(u32),

    #[error("assumed floor height {0:.2} m outside the accepted range [2.0, 6.0]")]
    FloorHeight(f64),

    #[error("roof area {roof:.1} m2 and floor area {floor:.1} m2 disagree by more than 50%")]
    EnvelopeAreaMismatch { roof: f64, floor: f64 },

    #[error("window areas imply a window-to-wall ratio of {0:.3}, outside [0.02, 0.95]")]
    WindowRatio(f64),

    #[error("net floor area {per_floor:.1} m2 per floor is too small for {floors} floors")]
    FootprintFloorMismatch { per_floor: f64, floors: u32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Fatal geometry infeasibility: the footprint cannot host a 5-zone split.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error(
        "footprint {length:.2} x {width:.2} m too small for a 5-zone layout: \
         core fraction {core_fraction:.3} stays below {min_fraction} \
         even at the minimum perimeter depth"
    )]
    TooSmall {
        length: f64,
        width: f64,
        core_fraction: f64,
        min_fraction: f64,
    },
}

/// Errors from the serialized-model verification/repair pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("surface block '{0}' not found in the serialized model text")]
    MissingSurfaceBlock(String),

    #[error("surface '{name}' has no boundary-partner field to verify")]
    MissingPartnerField { name: String },
}
