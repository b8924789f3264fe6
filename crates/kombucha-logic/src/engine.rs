//! Simulation engine: the single owner of one fermentation run.
//!
//! The engine holds the parameters, the current state and the history log.
//! Presentation layers drive it through four operations (`reset`, `step`,
//! `introduce_contaminant`, `get_state`) and never touch its internals.
//! Each session owns its own engine; there is no shared instance.
//!
//! ```
//! use kombucha_logic::engine::SimulationEngine;
//!
//! let mut engine = SimulationEngine::new();
//! engine.introduce_contaminant("mold").unwrap();
//! engine.step(7).unwrap();
//!
//! let view = engine.get_state();
//! assert_eq!(view.current.day, 7);
//! assert_eq!(view.history.len(), 8); // day 0 through day 7
//! ```

use serde::Serialize;

use crate::error::EngineError;
use crate::growth::barrier_block;
use crate::history::History;
use crate::integrator::advance_day;
use crate::params::{validate_params, Parameters};
use crate::state::SimulationState;
use crate::status::{assess_brew, BrewStatus};

/// Read-only view returned by [`SimulationEngine::get_state`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StateView<'a> {
    pub current: &'a SimulationState,
    pub history: &'a History,
}

/// Owns the state vector, parameters and history for one run.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    params: Parameters,
    state: SimulationState,
    history: History,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine {
    /// Create an engine with the default parameter set.
    pub fn new() -> Self {
        Self::build(Parameters::default())
    }

    /// Create an engine with a custom parameter set.
    pub fn with_params(params: Parameters) -> Result<Self, EngineError> {
        let errors = validate_params(&params);
        if !errors.is_empty() {
            return Err(EngineError::InvalidParameters(errors));
        }
        Ok(Self::build(params))
    }

    fn build(params: Parameters) -> Self {
        let mut engine = Self {
            state: SimulationState::initial(&params),
            history: History::new(),
            params,
        };
        engine.reset();
        engine
    }

    /// Restore the day-0 state and restart the history with it.
    pub fn reset(&mut self) -> &SimulationState {
        self.state = SimulationState::initial(&self.params);
        self.history.clear();
        self.history.record(&self.state);
        log::debug!(
            "Simulation reset: scoby={:.3} pH={:.2} O2={:.2}",
            self.state.scoby_size,
            self.state.ph,
            self.state.oxygen
        );
        &self.state
    }

    /// Advance `days` whole days, one Euler update per day.
    ///
    /// Fails with [`EngineError::InvalidArgument`] if `days <= 0`, leaving
    /// the state unchanged.
    pub fn step(&mut self, days: i64) -> Result<&SimulationState, EngineError> {
        if days <= 0 {
            return Err(EngineError::InvalidArgument {
                reason: format!("step count must be a positive integer, got {}", days),
            });
        }

        for _ in 0..days {
            self.state = advance_day(&self.state, &self.params);
            self.history.record(&self.state);
            log::trace!(
                "Day {}: scoby={:.3} pH={:.3} O2={:.3} B={:.3} Y={:.3} contaminants={:.3}",
                self.state.day,
                self.state.scoby_size,
                self.state.ph,
                self.state.oxygen,
                self.state.bacteria,
                self.state.yeast,
                self.state.contaminant_load()
            );
        }

        Ok(&self.state)
    }

    /// Seed a configured contaminant kind with its inoculum.
    ///
    /// A kind whose population is already above the extinction threshold
    /// is left alone. Unknown kinds fail with
    /// [`EngineError::UnknownContaminant`] and change nothing.
    pub fn introduce_contaminant(&mut self, kind: &str) -> Result<&SimulationState, EngineError> {
        let inoculum = self
            .params
            .contaminant(kind)
            .map(|profile| profile.inoculum)
            .ok_or_else(|| EngineError::UnknownContaminant {
                kind: kind.to_string(),
            })?;

        let current = self.state.contaminant(kind);
        if current > self.params.extinction_threshold {
            log::debug!(
                "{} already established at {:.3}, not re-seeding",
                kind,
                current
            );
            return Ok(&self.state);
        }

        self.state
            .contaminants
            .insert(kind.to_string(), inoculum);
        // Keep today's history entry in step with the live state.
        self.history.replace_latest(&self.state);
        log::info!(
            "{} introduced on day {} (population {:.3}, barrier {:.1}%)",
            kind,
            self.state.day,
            inoculum,
            self.barrier_block() * 100.0
        );
        Ok(&self.state)
    }

    /// Current state plus the full history.
    pub fn get_state(&self) -> StateView<'_> {
        StateView {
            current: &self.state,
            history: &self.history,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Contaminant kinds that can be introduced.
    pub fn configured_kinds(&self) -> impl Iterator<Item = &str> {
        self.params.contaminant_kinds()
    }

    /// Current barrier blocking probability `P_block`.
    pub fn barrier_block(&self) -> f64 {
        barrier_block(self.state.scoby_size, self.params.barrier_half_saturation)
    }

    /// Headline health verdict for the current state.
    pub fn status(&self) -> BrewStatus {
        assess_brew(&self.state, &self.params)
    }
}

/// Parse a raw step count, e.g. from a query string.
///
/// Rejects anything that is not a positive integer.
pub fn parse_step_count(raw: &str) -> Result<i64, EngineError> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|_| EngineError::InvalidArgument {
            reason: format!("step count must be a positive integer, got '{}'", raw),
        })?;
    if days <= 0 {
        return Err(EngineError::InvalidArgument {
            reason: format!("step count must be a positive integer, got {}", days),
        });
    }
    Ok(days)
}
