//! Empirical bounds and tuning constants for the geometry pipeline.
//!
//! These thresholds were chosen from practice, not from a cited engineering
//! standard. They are collected here so a domain expert can review and adjust
//! them in one place.

/// Plausible footprint aspect-ratio band (length / width).
pub const ASPECT_RATIO_MIN: f64 = 0.5;
pub const ASPECT_RATIO_MAX: f64 = 4.0;

/// Plausible envelope-area-to-volume band in 1/m (compactness).
pub const COMPACTNESS_MIN: f64 = 0.2;
pub const COMPACTNESS_MAX: f64 = 2.0;

/// Plausible storey-height band in m.
pub const FLOOR_HEIGHT_MIN: f64 = 2.3;
pub const FLOOR_HEIGHT_MAX: f64 = 4.5;

/// Roof/floor areas disagreeing by more than this fraction trigger a warning
/// in the exact solver strategy.
pub const FOOTPRINT_AGREEMENT_TOLERANCE: f64 = 0.02;

/// Relative tolerance for the direct-metrics compactness height search.
pub const COMPACTNESS_SEARCH_TOLERANCE: f64 = 0.05;
pub const HEIGHT_SEARCH_MAX_ITERS: usize = 10;

/// Perimeter-zone depth band in m, interpolated over the WWR band below.
pub const PERIMETER_DEPTH_MIN: f64 = 3.0;
pub const PERIMETER_DEPTH_MAX: f64 = 6.0;
pub const PERIMETER_WWR_LOW: f64 = 0.10;
pub const PERIMETER_WWR_HIGH: f64 = 0.60;

/// Depth is capped at this fraction of the smaller footprint dimension.
pub const PERIMETER_DEPTH_CAP_FRACTION: f64 = 0.30;

/// Adaptive lower bound on depth: max(1.5, min(3.0, 0.2 * min_dimension)).
pub const PERIMETER_DEPTH_FLOOR_LOW: f64 = 1.5;
pub const PERIMETER_DEPTH_FLOOR_HIGH: f64 = 3.0;
pub const PERIMETER_DEPTH_FLOOR_FRACTION: f64 = 0.2;

/// The core must occupy at least this fraction of the footprint.
pub const CORE_MIN_FRACTION: f64 = 0.30;

/// Windows below this WWR are omitted entirely.
pub const WWR_EMIT_THRESHOLD: f64 = 0.01;
/// Upper clamp avoiding degenerate all-glass walls.
pub const WWR_CLAMP: f64 = 0.95;

/// Window placement margins in m.
pub const WINDOW_SILL_HEIGHT: f64 = 0.8;
pub const WINDOW_HEAD_CLEARANCE: f64 = 0.3;
pub const WINDOW_EDGE_MARGIN: f64 = 0.1;
