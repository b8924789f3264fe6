//! Daily integration step: explicit Euler with a fixed one-day step.
//!
//! Each day the full set of deltas is computed from the pre-update state,
//! then applied together and clamped into the valid region. Computing
//! every delta before applying any of them keeps the result independent
//! of update order.

use std::collections::BTreeMap;

use crate::growth::{barrier_block, competition_factor, growth_factor};
use crate::params::Parameters;
use crate::state::SimulationState;

/// Per-day change for every state variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deltas {
    pub scoby_size: f64,
    pub ph: f64,
    pub oxygen: f64,
    pub bacteria: f64,
    pub yeast: f64,
    pub contaminants: BTreeMap<String, f64>,
}

/// Compute one day's deltas from `state`.
///
/// Contaminants present in the state but missing from `params` are left
/// unchanged.
pub fn compute_deltas(state: &SimulationState, params: &Parameters) -> Deltas {
    let s = state.scoby_size;
    let b = state.bacteria;
    let y = state.yeast;

    let g_b = growth_factor(state.ph, state.oxygen, &params.bacteria);
    let g_y = growth_factor(state.ph, state.oxygen, &params.yeast);
    let p_block = barrier_block(s, params.barrier_half_saturation);
    let competition = competition_factor(state.beneficial(), params.competition_coefficient);

    let contaminants = state
        .contaminants
        .iter()
        .map(|(kind, &pop)| {
            let delta = match params.contaminant(kind) {
                Some(profile) => {
                    let g_i = growth_factor(state.ph, state.oxygen, &profile.organism);
                    profile.organism.growth_rate * pop * g_i * (1.0 - p_block) * competition
                }
                None => 0.0,
            };
            (kind.clone(), delta)
        })
        .collect();

    Deltas {
        scoby_size: params.scoby_growth_rate * s * (1.0 - s / params.carrying_capacity),
        ph: -params.ph_decay * (s + b),
        oxygen: -params.oxygen_decay * (s + b + y),
        bacteria: params.bacteria.growth_rate * b * g_b,
        yeast: params.yeast.growth_rate * y * g_y,
        contaminants,
    }
}

/// Apply deltas to `state` and clamp into the valid region.
///
/// Does not touch `day`.
pub fn apply_deltas(state: &mut SimulationState, deltas: &Deltas, params: &Parameters) {
    state.scoby_size = (state.scoby_size + deltas.scoby_size).clamp(0.0, params.carrying_capacity);
    // pH can only fall: the floor applies, but never lifts a value already below it.
    state.ph = (state.ph + deltas.ph).max(params.ph_floor).min(state.ph);
    state.oxygen = (state.oxygen + deltas.oxygen).max(0.0);
    state.bacteria = (state.bacteria + deltas.bacteria).max(0.0);
    state.yeast = (state.yeast + deltas.yeast).max(0.0);
    for (kind, pop) in state.contaminants.iter_mut() {
        let delta = deltas.contaminants.get(kind).copied().unwrap_or(0.0);
        *pop = (*pop + delta).max(0.0);
    }
}

/// Advance `state` by exactly one day.
pub fn advance_day(state: &SimulationState, params: &Parameters) -> SimulationState {
    let deltas = compute_deltas(state, params);
    let mut next = state.clone();
    apply_deltas(&mut next, &deltas, params);
    next.day += 1;
    next
}
