//! Brew health assessment: a headline verdict for the dashboard.

use serde::{Deserialize, Serialize};

use crate::growth::barrier_block;
use crate::params::Parameters;
use crate::state::SimulationState;

/// Overall condition of the brew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewHealth {
    /// Acidified and free of contaminants.
    Healthy,
    /// Not yet acidified, or contaminants present but outnumbered.
    Watch,
    /// Contaminants rival or exceed the beneficial culture.
    Contaminated,
}

/// Assessment of one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewStatus {
    pub health: BrewHealth,
    /// Largest contaminant population, if any is above the extinction threshold.
    pub dominant_contaminant: Option<String>,
    pub contaminant_load: f64,
    /// Current `P_block` of the SCOBY mat.
    pub barrier_block: f64,
    /// pH at or below the acidification threshold.
    pub acidified: bool,
}

pub mod brew_constants {
    /// pH at or below which the brew counts as acidified.
    pub const ACIDIFIED_PH: f64 = 4.6;
    /// Contaminant-to-beneficial ratio at which the brew is contaminated.
    pub const CONTAMINATED_RATIO: f64 = 0.5;
}

/// Assess the health of a brew state.
pub fn assess_brew(state: &SimulationState, params: &Parameters) -> BrewStatus {
    use brew_constants::*;

    let threshold = params.extinction_threshold;
    let load = state.contaminant_load();
    let acidified = state.ph <= ACIDIFIED_PH;

    let dominant_contaminant = state
        .contaminants
        .iter()
        .filter(|&(_, &pop)| pop > threshold)
        .fold(None::<(&String, f64)>, |best, (kind, &pop)| match best {
            Some((_, top)) if top >= pop => best,
            _ => Some((kind, pop)),
        })
        .map(|(kind, _)| kind.clone());

    let beneficial = state.beneficial();
    let health = if dominant_contaminant.is_some()
        && (beneficial <= 0.0 || load / beneficial >= CONTAMINATED_RATIO)
    {
        BrewHealth::Contaminated
    } else if dominant_contaminant.is_some() || !acidified {
        BrewHealth::Watch
    } else {
        BrewHealth::Healthy
    };

    BrewStatus {
        health,
        dominant_contaminant,
        contaminant_load: load,
        barrier_block: barrier_block(state.scoby_size, params.barrier_half_saturation),
        acidified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (SimulationState, Parameters) {
        let params = Parameters::default();
        (SimulationState::initial(&params), params)
    }

    #[test]
    fn test_fresh_brew_needs_watching() {
        let (s, p) = state();
        let status = assess_brew(&s, &p);
        assert_eq!(status.health, BrewHealth::Watch);
        assert!(!status.acidified);
        assert!(status.dominant_contaminant.is_none());
    }

    #[test]
    fn test_acidified_clean_brew_is_healthy() {
        let (mut s, p) = state();
        s.ph = 3.2;
        assert_eq!(assess_brew(&s, &p).health, BrewHealth::Healthy);
    }

    #[test]
    fn test_trace_contaminant_ignored() {
        let (mut s, p) = state();
        s.ph = 3.2;
        s.contaminants.insert("mold".into(), 0.001);
        let status = assess_brew(&s, &p);
        assert_eq!(status.health, BrewHealth::Healthy);
        assert!(status.dominant_contaminant.is_none());
    }

    #[test]
    fn test_minor_contaminant_is_watch() {
        let (mut s, p) = state();
        s.ph = 3.2;
        s.bacteria = 10.0;
        s.yeast = 10.0;
        s.contaminants.insert("mold".into(), 1.0);
        let status = assess_brew(&s, &p);
        assert_eq!(status.health, BrewHealth::Watch);
        assert_eq!(status.dominant_contaminant.as_deref(), Some("mold"));
    }

    #[test]
    fn test_overrun_is_contaminated() {
        let (mut s, p) = state();
        s.contaminants.insert("mold".into(), 0.5);
        s.contaminants.insert("harmful_bacteria".into(), 3.0);
        let status = assess_brew(&s, &p);
        assert_eq!(status.health, BrewHealth::Contaminated);
        assert_eq!(
            status.dominant_contaminant.as_deref(),
            Some("harmful_bacteria")
        );
        assert_eq!(status.contaminant_load, 3.5);
    }

    #[test]
    fn test_no_beneficials_any_contaminant_wins() {
        let (mut s, p) = state();
        s.bacteria = 0.0;
        s.yeast = 0.0;
        s.contaminants.insert("mold".into(), 0.5);
        assert_eq!(assess_brew(&s, &p).health, BrewHealth::Contaminated);
    }

    #[test]
    fn test_barrier_reported() {
        let (mut s, p) = state();
        s.scoby_size = 2.0;
        assert_eq!(assess_brew(&s, &p).barrier_block, 0.5);
    }
}
