//! Full model assembly and serialization.
//!
//! Sequences the build: header and simulation metadata, geometry rules
//! (before any geometry record), materials and constructions, zones,
//! surfaces and windows, internal loads, infiltration, the HVAC stub and
//! output declarations — then writes the file and runs the partner
//! verification pass over the serialized text.

use crate::idf::library;
use crate::idf::object::{IdfDocument, IdfObject};
use crate::idf::repair;
use crate::idf::surfaces::{self, Boundary, GeneratedSurfaces, Surface, WindowSurface};
use crate::input::EnvelopeInput;
use crate::model::perimeter::{ZoneLayout, build_layouts};
use crate::model::solver::{GeometrySolution, solve};
use crate::model::windows::{OrientationRatios, distribute};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

const ENGINE_VERSION: &str = "9.4";

/// A fully assembled model plus the bookkeeping the repair pass needs.
#[derive(Debug, Clone)]
pub struct AssembledModel {
    pub document: IdfDocument,
    pub solution: GeometrySolution,
    pub ratios: OrientationRatios,
    pub zone_names: Vec<String>,
    /// Inter-zone partner references, collected before serialization.
    pub partner_map: HashMap<String, String>,
}

/// Runs the whole synthesis pipeline for a validated input.
///
/// Validation and geometry-infeasibility errors propagate; there is no
/// fallback layout to retreat to.
pub fn assemble(input: &EnvelopeInput) -> Result<AssembledModel> {
    input.validate()?;

    let solution = solve(input);
    let ratios = distribute(input, &solution);
    let layouts = build_layouts(&solution, ratios.average())?;
    let generated = surfaces::generate(&layouts, &ratios);

    let zone_names: Vec<String> = layouts
        .iter()
        .flat_map(|l| l.zones().map(|z| z.name.clone()))
        .collect();
    let partner_map = generated.partner_map.clone();

    let document = build_document(input, &layouts, &generated);
    info!(
        zones = zone_names.len(),
        surfaces = generated.surfaces.len(),
        windows = generated.windows.len(),
        "model assembled"
    );

    Ok(AssembledModel {
        document,
        solution,
        ratios,
        zone_names,
        partner_map,
    })
}

/// Assembles and writes the model file, then verifies the serialized text.
///
/// The verification re-reads the written file, checks that every inter-zone
/// surface block is present with the partner reference collected before
/// serialization, and patches the text if anything disagrees.
pub fn write_model(input: &EnvelopeInput, path: &Path) -> Result<AssembledModel> {
    let model = assemble(input)?;
    model.document.write_file(path)?;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to re-read model for verification: {}", path.display()))?;
    let outcome = repair::repair_surface_partners(&text, &model.partner_map)?;
    if !outcome.patched.is_empty() {
        warn!(
            count = outcome.patched.len(),
            "serialized model required partner repairs"
        );
        std::fs::write(path, &outcome.text)
            .with_context(|| format!("Failed to write repaired model: {}", path.display()))?;
    }
    info!(path = %path.display(), "model file written");
    Ok(model)
}

fn build_document(
    input: &EnvelopeInput,
    layouts: &[ZoneLayout],
    generated: &GeneratedSurfaces,
) -> IdfDocument {
    let mut doc = IdfDocument::new();

    doc.push(IdfObject::new("Version").field(ENGINE_VERSION, "Version Identifier"));
    doc.push(
        IdfObject::new("SimulationControl")
            .field("No", "Do Zone Sizing Calculation")
            .field("No", "Do System Sizing Calculation")
            .field("No", "Do Plant Sizing Calculation")
            .field("No", "Run Simulation for Sizing Periods")
            .field("Yes", "Run Simulation for Weather File Run Periods"),
    );
    doc.push(
        IdfObject::new("Building")
            .field("Certificate_Building", "Name")
            .num(0.0, "North Axis {deg}")
            .field("Suburbs", "Terrain")
            .num(0.04, "Loads Convergence Tolerance Value")
            .num(0.4, "Temperature Convergence Tolerance Value {deltaC}")
            .field("FullExterior", "Solar Distribution")
            .int(25, "Maximum Number of Warmup Days")
            .int(6, "Minimum Number of Warmup Days"),
    );
    doc.push(IdfObject::new("Timestep").int(4, "Number of Timesteps per Hour"));
    // Must precede every geometry record.
    doc.push(
        IdfObject::new("GlobalGeometryRules")
            .field("LowerLeftCorner", "Starting Vertex Position")
            .field("Counterclockwise", "Vertex Entry Direction")
            .field("World", "Coordinate System"),
    );
    doc.push(
        IdfObject::new("RunPeriod")
            .field("Annual", "Name")
            .int(1, "Begin Month")
            .int(1, "Begin Day of Month")
            .field("", "Begin Year")
            .int(12, "End Month")
            .int(31, "End Day of Month")
            .field("", "End Year")
            .field("", "Day of Week for Start Day")
            .field("Yes", "Use Weather File Holidays and Special Days")
            .field("Yes", "Use Weather File Daylight Saving Period")
            .field("No", "Apply Weekend Holiday Rule")
            .field("Yes", "Use Weather File Rain Indicators")
            .field("Yes", "Use Weather File Snow Indicators"),
    );
    // Placeholder station; the weather file supplies the real location.
    doc.push(
        IdfObject::new("Site:Location")
            .field("Climate_Station_Placeholder", "Name")
            .num(52.47, "Latitude {deg}")
            .num(13.40, "Longitude {deg}")
            .num(1.0, "Time Zone {hr}")
            .num(34.0, "Elevation {m}"),
    );

    doc.extend(library::schedules());
    doc.extend(library::materials(input));

    for layout in layouts {
        for zone in layout.zones() {
            doc.push(zone_record(&zone.name));
        }
    }
    for surface in &generated.surfaces {
        doc.push(surface_record(surface));
    }
    for window in &generated.windows {
        doc.push(window_record(window));
    }

    for layout in layouts {
        for zone in layout.zones() {
            doc.extend(library::zone_loads(&zone.name, input.building_type));
            doc.push(library::zone_infiltration(&zone.name, input.infiltration_ach));
            doc.extend(library::zone_hvac(&zone.name));
        }
    }

    doc.extend(library::outputs());
    doc
}

fn zone_record(name: &str) -> IdfObject {
    IdfObject::new("Zone")
        .field(name, "Name")
        .num(0.0, "Direction of Relative North {deg}")
        .num(0.0, "X Origin {m}")
        .num(0.0, "Y Origin {m}")
        .num(0.0, "Z Origin {m}")
        .int(1, "Type")
        .int(1, "Multiplier")
        .field("autocalculate", "Ceiling Height {m}")
        .field("autocalculate", "Volume {m3}")
}

fn surface_record(surface: &Surface) -> IdfObject {
    let (condition, partner) = match &surface.boundary {
        Boundary::Ground => ("Ground", String::new()),
        Boundary::Outdoors => ("Outdoors", String::new()),
        Boundary::Surface { partner } => ("Surface", partner.clone()),
    };
    IdfObject::new("BuildingSurface:Detailed")
        .field(&surface.name, "Name")
        .field(surface.kind.label(), "Surface Type")
        .field(&surface.construction, "Construction Name")
        .field(&surface.zone, "Zone Name")
        .field(condition, "Outside Boundary Condition")
        .field(partner, "Outside Boundary Condition Object")
        .field(
            if surface.sun_exposed { "SunExposed" } else { "NoSun" },
            "Sun Exposure",
        )
        .field(
            if surface.wind_exposed { "WindExposed" } else { "NoWind" },
            "Wind Exposure",
        )
        .field("autocalculate", "View Factor to Ground")
        .vertices(&surface.vertices)
}

fn window_record(window: &WindowSurface) -> IdfObject {
    IdfObject::new("FenestrationSurface:Detailed")
        .field(&window.name, "Name")
        .field("Window", "Surface Type")
        .field(&window.construction, "Construction Name")
        .field(&window.parent_wall, "Building Surface Name")
        .field("", "Outside Boundary Condition Object")
        .field("autocalculate", "View Factor to Ground")
        .field("", "Frame and Divider Name")
        .int(1, "Multiplier")
        .vertices(&window.vertices)
}
