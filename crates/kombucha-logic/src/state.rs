//! The simulation state vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::Parameters;

/// State of the culture at the end of a simulated day.
///
/// The engine owns exactly one of these; callers only ever see shared
/// borrows or clones of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Elapsed simulated days.
    pub day: u64,
    /// SCOBY cellulose mat biomass, bounded by the carrying capacity.
    pub scoby_size: f64,
    pub ph: f64,
    /// Dissolved oxygen, never negative.
    pub oxygen: f64,
    pub bacteria: f64,
    pub yeast: f64,
    /// Population per introduced contaminant kind. Kinds that were never
    /// introduced are absent (implicitly zero); introduced kinds stay.
    pub contaminants: BTreeMap<String, f64>,
}

/// Externally visible copy of a [`SimulationState`].
pub type StateSnapshot = SimulationState;

impl SimulationState {
    /// The day-0 state derived from parameters. Identical for construction
    /// and reset.
    pub fn initial(params: &Parameters) -> Self {
        let init = &params.initial;
        Self {
            day: 0,
            scoby_size: init.scoby_size,
            ph: init.ph,
            oxygen: init.oxygen,
            bacteria: init.bacteria,
            yeast: init.yeast,
            contaminants: BTreeMap::new(),
        }
    }

    /// Population of a contaminant kind, zero if never introduced.
    pub fn contaminant(&self, kind: &str) -> f64 {
        self.contaminants.get(kind).copied().unwrap_or(0.0)
    }

    /// Sum of all contaminant populations.
    pub fn contaminant_load(&self) -> f64 {
        self.contaminants.values().sum()
    }

    /// Beneficial population (bacteria + yeast).
    pub fn beneficial(&self) -> f64 {
        self.bacteria + self.yeast
    }
}
