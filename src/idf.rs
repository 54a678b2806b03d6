//! Emission of the engine's line-oriented model format.
//!
//! `object` holds the positional-record builder and document writer/scanner,
//! `surfaces` turns zone layouts into boundary surfaces and windows,
//! `library` emits materials, schedules, loads and the HVAC stub,
//! `assembler` sequences the full model, and `repair` is the post-write
//! partner-reference verification pass.

pub mod assembler;
pub mod library;
pub mod object;
pub mod repair;
pub mod surfaces;
