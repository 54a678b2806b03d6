//! Five-zone building model synthesis for energy-certificate data.
//!
//! Reconstructs a rectangular 3D building from the partial envelope
//! quantities found on an energy certificate, partitions every storey into
//! four perimeter zones plus a core, emits the result as a simulation-ready
//! model file and drives the external simulation engine over it.
//!
//! The pipeline is `input` (parse and validate the certificate data),
//! `model` (geometry solver, zone layout, window distribution), `idf`
//! (model-file emission and verification) and `run` (engine orchestration).

pub mod error;
pub mod geom;
pub mod idf;
pub mod input;
pub mod model;
pub mod run;

pub use geom::point::Point;
pub use geom::rect::Rect;
pub use geom::vector::Vector;

pub use error::{GeometryError, ModelError, ValidationError};
pub use idf::assembler::{AssembledModel, assemble, write_model};
pub use idf::object::{IdfDocument, IdfObject};
pub use input::{BuildingType, EnvelopeInput, OrientationAreas};
pub use model::Orientation;
pub use model::perimeter::{ZoneGeometry, ZoneLayout};
pub use model::solver::{GeometrySolution, SolverStrategy};
pub use model::windows::OrientationRatios;
pub use run::{BatchJob, BatchReport, RunOutcome, SimulationRunner, run_batch};
