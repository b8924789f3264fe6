//! Pure simulation logic for the kombucha fermentation simulator.
//!
//! This crate models a fermenting kombucha culture over discrete daily
//! steps: SCOBY biomass, beneficial bacteria and yeast, and any introduced
//! contaminants, coupled through pH and dissolved oxygen. Functions take
//! plain data and return results with no I/O, so the same engine can back
//! a web dashboard, the headless harness, or a test.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`engine`] | `SimulationEngine`: reset, step, introduce contaminant, get state |
//! | [`error`] | `EngineError` taxonomy (invalid argument, unknown contaminant) |
//! | [`growth`] | pH/oxygen preference curves, barrier blocking, competition |
//! | [`history`] | Append-only daily snapshot log and chart series |
//! | [`integrator`] | Fixed-step Euler update with simultaneous apply and clamping |
//! | [`params`] | Run parameters, contaminant catalogue, validation |
//! | [`state`] | The simulation state vector |
//! | [`status`] | Brew health verdict for display |

pub mod engine;
pub mod error;
pub mod growth;
pub mod history;
pub mod integrator;
pub mod params;
pub mod state;
pub mod status;

pub use engine::{parse_step_count, SimulationEngine, StateView};
pub use error::EngineError;
pub use params::Parameters;
pub use state::{SimulationState, StateSnapshot};
