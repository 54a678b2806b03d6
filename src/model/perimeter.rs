//! Perimeter/core zoning of a solved footprint.
//!
//! Splits every floor into 4 perimeter strips plus a core rectangle. The
//! perimeter depth adapts to the window-to-wall ratio and shrinks until the
//! core holds at least 30% of the footprint; if that cannot be met the
//! footprint is too small for a 5-zone layout and zoning fails hard.

use crate::Point;
use crate::Rect;
use crate::error::GeometryError;
use crate::model::Orientation;
use crate::model::limits::*;
use crate::model::solver::GeometrySolution;
use tracing::debug;

/// One rectangular zone footprint extruded to a storey height.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGeometry {
    pub name: String,
    /// Minimum corner; `origin.z` is the floor elevation.
    pub origin: Point,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneGeometry {
    fn new(name: String, rect: Rect, z: f64, height: f64) -> Self {
        Self {
            name,
            origin: Point::new(rect.x, rect.y, z),
            length: rect.length,
            width: rect.width,
            height,
        }
    }

    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }

    pub fn volume(&self) -> f64 {
        self.floor_area() * self.height
    }

    pub fn footprint(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.length, self.width)
    }

    /// Footprint corners in counter-clockwise order viewed from above,
    /// at floor elevation.
    pub fn corners(&self) -> [Point; 4] {
        self.footprint().corners_ccw(self.origin.z)
    }

    /// Elevation of this zone's ceiling.
    pub fn top(&self) -> f64 {
        self.origin.z + self.height
    }
}

/// The 5 zones of one floor.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLayout {
    /// 0-based floor index; zone names use the 1-based form (`F1`, `F2`, ...).
    pub floor_index: u32,
    pub north: ZoneGeometry,
    pub east: ZoneGeometry,
    pub south: ZoneGeometry,
    pub west: ZoneGeometry,
    pub core: ZoneGeometry,
}

impl ZoneLayout {
    pub fn zones(&self) -> [&ZoneGeometry; 5] {
        [&self.north, &self.east, &self.south, &self.west, &self.core]
    }

    pub fn perimeter(&self, orientation: Orientation) -> &ZoneGeometry {
        match orientation {
            Orientation::North => &self.north,
            Orientation::East => &self.east,
            Orientation::South => &self.south,
            Orientation::West => &self.west,
        }
    }

    pub fn total_floor_area(&self) -> f64 {
        self.zones().iter().map(|z| z.floor_area()).sum()
    }

    /// Fraction of the floor area held by the 4 perimeter zones.
    pub fn perimeter_fraction(&self) -> f64 {
        1.0 - self.core.floor_area() / self.total_floor_area()
    }
}

/// Depth of the perimeter strips before the core-area constraint.
///
/// Linear interpolation between the depth band endpoints as the WWR moves
/// through [0.10, 0.60], capped at 30% of the smaller footprint dimension.
/// Deeper daylight zones accompany larger glazing fractions.
pub fn perimeter_depth(length: f64, width: f64, wwr: f64) -> f64 {
    let t = ((wwr - PERIMETER_WWR_LOW) / (PERIMETER_WWR_HIGH - PERIMETER_WWR_LOW)).clamp(0.0, 1.0);
    let depth = PERIMETER_DEPTH_MIN + t * (PERIMETER_DEPTH_MAX - PERIMETER_DEPTH_MIN);
    depth.min(PERIMETER_DEPTH_CAP_FRACTION * length.min(width))
}

/// Final depth honoring the minimum-core-area constraint.
///
/// Shrinks in 10% steps down to an adaptive floor until the core reaches
/// [`CORE_MIN_FRACTION`] of the footprint.
pub fn resolve_depth(length: f64, width: f64, wwr: f64) -> Result<f64, GeometryError> {
    let total = length * width;
    let min_dim = length.min(width);
    let depth_floor = (PERIMETER_DEPTH_FLOOR_FRACTION * min_dim)
        .clamp(PERIMETER_DEPTH_FLOOR_LOW, PERIMETER_DEPTH_FLOOR_HIGH);

    let core_fraction = |d: f64| {
        let core_l = length - 2.0 * d;
        let core_w = width - 2.0 * d;
        if core_l <= 0.0 || core_w <= 0.0 {
            0.0
        } else {
            core_l * core_w / total
        }
    };

    let mut depth = perimeter_depth(length, width, wwr);
    loop {
        if core_fraction(depth) >= CORE_MIN_FRACTION - 1e-9 {
            return Ok(depth);
        }
        if depth <= depth_floor + 1e-12 {
            break;
        }
        depth = (depth * 0.9).max(depth_floor);
    }

    Err(GeometryError::TooSmall {
        length,
        width,
        core_fraction: core_fraction(depth),
        min_fraction: CORE_MIN_FRACTION,
    })
}

/// Builds the per-floor zone layouts for a solved massing.
///
/// Every floor uses the same plan, offset in Z by the storey height.
pub fn build_layouts(
    solution: &GeometrySolution,
    wwr: f64,
) -> Result<Vec<ZoneLayout>, GeometryError> {
    let depth = resolve_depth(solution.length, solution.width, wwr)?;
    let floor_height = solution.floor_height();
    debug!(
        depth,
        floors = solution.floor_count,
        "perimeter depth resolved"
    );

    let layouts = (0..solution.floor_count)
        .map(|k| {
            build_floor_layout(
                solution.length,
                solution.width,
                depth,
                k,
                k as f64 * floor_height,
                floor_height,
            )
        })
        .collect();
    Ok(layouts)
}

/// One floor's 5-zone plan.
///
/// North/south strips span the full length; east/west strips fill the
/// remaining width between them; the core takes the interior. The 5
/// rectangles tile the footprint exactly.
fn build_floor_layout(
    length: f64,
    width: f64,
    depth: f64,
    floor_index: u32,
    z: f64,
    floor_height: f64,
) -> ZoneLayout {
    let d = depth;
    let inner_w = width - 2.0 * d;
    let inner_l = length - 2.0 * d;
    let f = floor_index + 1;

    let south = Rect::new(0.0, 0.0, length, d);
    let north = Rect::new(0.0, width - d, length, d);
    let west = Rect::new(0.0, d, d, inner_w);
    let east = Rect::new(length - d, d, d, inner_w);
    let core = Rect::new(d, d, inner_l, inner_w);

    ZoneLayout {
        floor_index,
        north: ZoneGeometry::new(format!("Perimeter_North_F{f}"), north, z, floor_height),
        east: ZoneGeometry::new(format!("Perimeter_East_F{f}"), east, z, floor_height),
        south: ZoneGeometry::new(format!("Perimeter_South_F{f}"), south, z, floor_height),
        west: ZoneGeometry::new(format!("Perimeter_West_F{f}"), west, z, floor_height),
        core: ZoneGeometry::new(format!("Core_F{f}"), core, z, floor_height),
    }
}
