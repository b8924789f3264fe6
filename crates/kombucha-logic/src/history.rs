//! Append-only log of daily state snapshots, used for charting.
//!
//! Index `i` holds the snapshot for day `i`. The log is cleared only by an
//! engine reset.

use serde::{Deserialize, Serialize};

use crate::state::SimulationState;

/// Scalar state quantities that can be charted over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    ScobySize,
    Ph,
    Oxygen,
    Bacteria,
    Yeast,
    ContaminantLoad,
}

impl Quantity {
    pub fn all() -> &'static [Quantity] {
        &[
            Quantity::ScobySize,
            Quantity::Ph,
            Quantity::Oxygen,
            Quantity::Bacteria,
            Quantity::Yeast,
            Quantity::ContaminantLoad,
        ]
    }

    /// Read this quantity from a state.
    pub fn of(self, state: &SimulationState) -> f64 {
        match self {
            Quantity::ScobySize => state.scoby_size,
            Quantity::Ph => state.ph,
            Quantity::Oxygen => state.oxygen,
            Quantity::Bacteria => state.bacteria,
            Quantity::Yeast => state.yeast,
            Quantity::ContaminantLoad => state.contaminant_load(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quantity::ScobySize => "SCOBY size",
            Quantity::Ph => "pH",
            Quantity::Oxygen => "Oxygen",
            Quantity::Bacteria => "Bacteria",
            Quantity::Yeast => "Yeast",
            Quantity::ContaminantLoad => "Contaminant load",
        }
    }
}

/// Ordered snapshots, one per simulated day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: Vec<SimulationState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of `state`.
    pub fn record(&mut self, state: &SimulationState) {
        self.snapshots.push(state.clone());
    }

    /// Overwrite the most recent snapshot, e.g. after a same-day
    /// contaminant introduction. Records instead if the log is empty.
    pub fn replace_latest(&mut self, state: &SimulationState) {
        match self.snapshots.last_mut() {
            Some(last) => *last = state.clone(),
            None => self.record(state),
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&SimulationState> {
        self.snapshots.last()
    }

    /// Snapshot recorded for `day`.
    pub fn on_day(&self, day: u64) -> Option<&SimulationState> {
        usize::try_from(day)
            .ok()
            .and_then(|i| self.snapshots.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationState> {
        self.snapshots.iter()
    }

    pub fn as_slice(&self) -> &[SimulationState] {
        &self.snapshots
    }

    /// One value per recorded day for a scalar quantity.
    pub fn series(&self, quantity: Quantity) -> Vec<f64> {
        self.snapshots.iter().map(|s| quantity.of(s)).collect()
    }

    /// One value per recorded day for a contaminant kind, zero on days
    /// before it was introduced.
    pub fn contaminant_series(&self, kind: &str) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.contaminant(kind)).collect()
    }

    /// Every contaminant kind that appears anywhere in the log, sorted.
    pub fn contaminant_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .snapshots
            .iter()
            .flat_map(|s| s.contaminants.keys().map(String::as_str))
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }
}
