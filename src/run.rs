//! Simulation engine orchestration.
//!
//! Drives the external simulation executable over generated model files:
//! single runs with timeout supervision ([`runner`]) and parallel batches
//! over a worker pool ([`batch`]).

pub mod batch;
pub mod runner;

pub use batch::{BatchJob, BatchReport, run_batch};
pub use runner::{RunOutcome, SimulationRunner};
