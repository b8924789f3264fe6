//! Run parameters: growth rates, preference curves, the contaminant catalogue.
//!
//! A [`Parameters`] value is fixed for the lifetime of a run. It seeds the
//! initial state on construction and on every reset, and supplies every
//! coefficient the daily integration step reads.
//!
//! Organisms are described by data, not by code: each one carries an
//! [`OrganismProfile`] (growth rate plus pH and oxygen [`Preference`]s), and
//! contaminant kinds live in a name-keyed map. Adding a new contaminant is a
//! new map entry.
//!
//! ```
//! use kombucha_logic::params::{validate_params, Parameters};
//!
//! let params = Parameters::default();
//! assert!(validate_params(&params).is_empty());
//! assert!(params.contaminants.contains_key("mold"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Preferred value and tolerance width for one environmental variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    /// Value at which the organism grows fastest.
    pub optimum: f64,
    /// Distance from the optimum at which growth drops to ~61% (one sigma).
    pub tolerance: f64,
}

impl Preference {
    pub const fn new(optimum: f64, tolerance: f64) -> Self {
        Self { optimum, tolerance }
    }
}

/// Growth rate and environmental preferences for one organism kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrganismProfile {
    /// Intrinsic growth rate per day under ideal conditions.
    pub growth_rate: f64,
    pub ph: Preference,
    pub oxygen: Preference,
}

/// A contaminant kind: its organism profile plus the population it starts
/// with when introduced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContaminantProfile {
    #[serde(flatten)]
    pub organism: OrganismProfile,
    /// Population set on introduction.
    pub inoculum: f64,
}

/// Day-0 values for the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub scoby_size: f64,
    pub ph: f64,
    pub oxygen: f64,
    pub bacteria: f64,
    pub yeast: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            scoby_size: 1.0,
            ph: 5.0,
            oxygen: 10.0,
            bacteria: 1.0,
            yeast: 1.0,
        }
    }
}

/// Full parameter set for one simulation run.
///
/// Missing fields in JSON input fall back to [`Parameters::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub initial: InitialConditions,

    /// SCOBY logistic growth rate `r_s`.
    pub scoby_growth_rate: f64,
    /// SCOBY carrying capacity `K`.
    pub carrying_capacity: f64,

    /// pH drop per day per unit of (SCOBY + bacteria).
    pub ph_decay: f64,
    /// pH never falls below this value.
    pub ph_floor: f64,
    /// Oxygen consumed per day per unit of (SCOBY + bacteria + yeast).
    pub oxygen_decay: f64,

    /// Barrier half-saturation `S_half`: the SCOBY size that blocks half of
    /// contaminant growth.
    pub barrier_half_saturation: f64,

    pub bacteria: OrganismProfile,
    pub yeast: OrganismProfile,
    pub contaminants: BTreeMap<String, ContaminantProfile>,

    /// Populations at or below this are treated as absent when re-seeding.
    pub extinction_threshold: f64,
    /// Strength of competitive exclusion of contaminants by bacteria and
    /// yeast. Zero disables it.
    pub competition_coefficient: f64,
}

/// Reference values used by [`Parameters::default`].
pub mod defaults {
    use super::{ContaminantProfile, OrganismProfile, Preference};

    pub const SCOBY_GROWTH_RATE: f64 = 0.3;
    pub const CARRYING_CAPACITY: f64 = 100.0;
    pub const PH_DECAY: f64 = 0.05;
    pub const PH_FLOOR: f64 = 2.5;
    pub const OXYGEN_DECAY: f64 = 0.1;
    pub const BARRIER_HALF_SATURATION: f64 = 2.0;
    pub const EXTINCTION_THRESHOLD: f64 = 0.01;

    /// Acetic acid bacteria: acid-loving, microaerophilic.
    pub const BACTERIA: OrganismProfile = OrganismProfile {
        growth_rate: 0.4,
        ph: Preference::new(3.5, 1.5),
        oxygen: Preference::new(2.0, 4.0),
    };

    /// Fermenting yeast: mildly acidic, prefers some oxygen.
    pub const YEAST: OrganismProfile = OrganismProfile {
        growth_rate: 0.3,
        ph: Preference::new(4.0, 1.5),
        oxygen: Preference::new(5.0, 5.0),
    };

    /// Surface mold: needs high pH and plenty of oxygen.
    pub const MOLD: ContaminantProfile = ContaminantProfile {
        organism: OrganismProfile {
            growth_rate: 0.5,
            ph: Preference::new(5.5, 1.0),
            oxygen: Preference::new(8.0, 4.0),
        },
        inoculum: 0.5,
    };

    /// Spoilage bacteria: more acid tolerant, copes with low oxygen.
    pub const HARMFUL_BACTERIA: ContaminantProfile = ContaminantProfile {
        organism: OrganismProfile {
            growth_rate: 0.3,
            ph: Preference::new(4.5, 1.2),
            oxygen: Preference::new(2.0, 5.0),
        },
        inoculum: 0.5,
    };
}

impl Default for Parameters {
    fn default() -> Self {
        let mut contaminants = BTreeMap::new();
        contaminants.insert("mold".to_string(), defaults::MOLD);
        contaminants.insert("harmful_bacteria".to_string(), defaults::HARMFUL_BACTERIA);

        Self {
            initial: InitialConditions::default(),
            scoby_growth_rate: defaults::SCOBY_GROWTH_RATE,
            carrying_capacity: defaults::CARRYING_CAPACITY,
            ph_decay: defaults::PH_DECAY,
            ph_floor: defaults::PH_FLOOR,
            oxygen_decay: defaults::OXYGEN_DECAY,
            barrier_half_saturation: defaults::BARRIER_HALF_SATURATION,
            bacteria: defaults::BACTERIA,
            yeast: defaults::YEAST,
            contaminants,
            extinction_threshold: defaults::EXTINCTION_THRESHOLD,
            competition_coefficient: 0.0,
        }
    }
}

impl Parameters {
    /// Profile for a configured contaminant kind.
    pub fn contaminant(&self, kind: &str) -> Option<&ContaminantProfile> {
        self.contaminants.get(kind)
    }

    /// Configured contaminant kinds in stable (sorted) order.
    pub fn contaminant_kinds(&self) -> impl Iterator<Item = &str> {
        self.contaminants.keys().map(String::as_str)
    }
}

/// Parameter validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Growth rate negative or not finite.
    InvalidGrowthRate { organism: String, rate: f64 },
    /// Carrying capacity must be positive.
    NonPositiveCapacity(f64),
    /// Barrier half-saturation must be positive.
    NonPositiveHalfSaturation(f64),
    /// Preference tolerance must be positive.
    NonPositiveTolerance {
        organism: String,
        variable: &'static str,
        tolerance: f64,
    },
    /// A decay coefficient is negative or not finite.
    InvalidDecay { name: &'static str, value: f64 },
    /// Initial SCOBY size outside `[0, K]`.
    InitialScobyOutOfRange { size: f64, capacity: f64 },
    /// An initial population or oxygen level is negative or not finite.
    InvalidInitialValue { name: &'static str, value: f64 },
    /// Initial pH starts below the floor.
    InitialPhBelowFloor { ph: f64, floor: f64 },
    /// Inoculation size must be positive.
    NonPositiveInoculum { kind: String, inoculum: f64 },
    /// Inoculum at or below the extinction threshold, so a living
    /// population could be re-seeded downward.
    InoculumNotAboveThreshold {
        kind: String,
        inoculum: f64,
        threshold: f64,
    },
    /// Extinction threshold negative or not finite.
    InvalidExtinctionThreshold(f64),
    /// Competition coefficient negative or not finite.
    InvalidCompetition(f64),
    /// Contaminant kind with an empty name.
    EmptyContaminantName,
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::InvalidGrowthRate { organism, rate } => {
                write!(f, "growth rate for {} must be >= 0, got {}", organism, rate)
            }
            ParamError::NonPositiveCapacity(k) => {
                write!(f, "carrying capacity must be > 0, got {}", k)
            }
            ParamError::NonPositiveHalfSaturation(h) => {
                write!(f, "barrier half-saturation must be > 0, got {}", h)
            }
            ParamError::NonPositiveTolerance {
                organism,
                variable,
                tolerance,
            } => write!(
                f,
                "{} tolerance for {} must be > 0, got {}",
                variable, organism, tolerance
            ),
            ParamError::InvalidDecay { name, value } => {
                write!(f, "{} must be >= 0, got {}", name, value)
            }
            ParamError::InitialScobyOutOfRange { size, capacity } => write!(
                f,
                "initial SCOBY size {} is outside [0, {}]",
                size, capacity
            ),
            ParamError::InvalidInitialValue { name, value } => {
                write!(f, "initial {} must be >= 0, got {}", name, value)
            }
            ParamError::InitialPhBelowFloor { ph, floor } => {
                write!(f, "initial pH {} is below the floor {}", ph, floor)
            }
            ParamError::NonPositiveInoculum { kind, inoculum } => {
                write!(f, "inoculum for {} must be > 0, got {}", kind, inoculum)
            }
            ParamError::InoculumNotAboveThreshold {
                kind,
                inoculum,
                threshold,
            } => write!(
                f,
                "inoculum for {} must exceed the extinction threshold {}, got {}",
                kind, threshold, inoculum
            ),
            ParamError::InvalidExtinctionThreshold(t) => {
                write!(f, "extinction threshold must be >= 0, got {}", t)
            }
            ParamError::InvalidCompetition(c) => {
                write!(f, "competition coefficient must be >= 0, got {}", c)
            }
            ParamError::EmptyContaminantName => write!(f, "contaminant kind name is empty"),
        }
    }
}

impl std::error::Error for ParamError {}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn check_organism(name: &str, profile: &OrganismProfile, errors: &mut Vec<ParamError>) {
    if !non_negative(profile.growth_rate) {
        errors.push(ParamError::InvalidGrowthRate {
            organism: name.to_string(),
            rate: profile.growth_rate,
        });
    }
    for (variable, pref) in [("pH", &profile.ph), ("oxygen", &profile.oxygen)] {
        if !positive(pref.tolerance) {
            errors.push(ParamError::NonPositiveTolerance {
                organism: name.to_string(),
                variable,
                tolerance: pref.tolerance,
            });
        }
    }
}

/// Validate a parameter set, returning all errors found.
pub fn validate_params(params: &Parameters) -> Vec<ParamError> {
    let mut errors = Vec::new();

    if !non_negative(params.scoby_growth_rate) {
        errors.push(ParamError::InvalidGrowthRate {
            organism: "scoby".to_string(),
            rate: params.scoby_growth_rate,
        });
    }
    if !positive(params.carrying_capacity) {
        errors.push(ParamError::NonPositiveCapacity(params.carrying_capacity));
    }
    if !positive(params.barrier_half_saturation) {
        errors.push(ParamError::NonPositiveHalfSaturation(
            params.barrier_half_saturation,
        ));
    }

    for (name, value) in [
        ("ph_decay", params.ph_decay),
        ("oxygen_decay", params.oxygen_decay),
    ] {
        if !non_negative(value) {
            errors.push(ParamError::InvalidDecay { name, value });
        }
    }

    check_organism("bacteria", &params.bacteria, &mut errors);
    check_organism("yeast", &params.yeast, &mut errors);

    for (kind, profile) in &params.contaminants {
        if kind.trim().is_empty() {
            errors.push(ParamError::EmptyContaminantName);
        }
        check_organism(kind, &profile.organism, &mut errors);
        if !positive(profile.inoculum) {
            errors.push(ParamError::NonPositiveInoculum {
                kind: kind.clone(),
                inoculum: profile.inoculum,
            });
        } else if non_negative(params.extinction_threshold)
            && profile.inoculum <= params.extinction_threshold
        {
            errors.push(ParamError::InoculumNotAboveThreshold {
                kind: kind.clone(),
                inoculum: profile.inoculum,
                threshold: params.extinction_threshold,
            });
        }
    }

    let init = &params.initial;
    if !(non_negative(init.scoby_size) && init.scoby_size <= params.carrying_capacity) {
        errors.push(ParamError::InitialScobyOutOfRange {
            size: init.scoby_size,
            capacity: params.carrying_capacity,
        });
    }
    for (name, value) in [
        ("oxygen", init.oxygen),
        ("bacteria", init.bacteria),
        ("yeast", init.yeast),
    ] {
        if !non_negative(value) {
            errors.push(ParamError::InvalidInitialValue { name, value });
        }
    }
    if !init.ph.is_finite() || !params.ph_floor.is_finite() || init.ph < params.ph_floor {
        errors.push(ParamError::InitialPhBelowFloor {
            ph: init.ph,
            floor: params.ph_floor,
        });
    }

    if !non_negative(params.extinction_threshold) {
        errors.push(ParamError::InvalidExtinctionThreshold(
            params.extinction_threshold,
        ));
    }
    if !non_negative(params.competition_coefficient) {
        errors.push(ParamError::InvalidCompetition(
            params.competition_coefficient,
        ));
    }

    errors
}
