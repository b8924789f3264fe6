//! Growth-factor functions.
//!
//! Every organism's response to its environment is the product of two
//! unimodal preference curves, one for pH and one for dissolved oxygen.
//! Each curve is a Gaussian bump: exactly 1.0 at the organism's optimum,
//! falling toward 0.0 as conditions move away from it. Contaminants are
//! further suppressed by the SCOBY mat (the physical barrier) and,
//! optionally, by competition from the beneficial populations.

use crate::params::{OrganismProfile, Preference};

/// How favourable `value` is relative to a preference, in `[0, 1]`.
pub fn preference_factor(value: f64, pref: &Preference) -> f64 {
    if pref.tolerance <= 0.0 {
        // Degenerate curve: only the exact optimum is habitable.
        return if value == pref.optimum { 1.0 } else { 0.0 };
    }
    let z = (value - pref.optimum) / pref.tolerance;
    (-0.5 * z * z).exp()
}

/// Combined pH and oxygen growth multiplier for an organism, in `[0, 1]`.
pub fn growth_factor(ph: f64, oxygen: f64, profile: &OrganismProfile) -> f64 {
    preference_factor(ph, &profile.ph) * preference_factor(oxygen, &profile.oxygen)
}

/// Fraction of contaminant growth blocked by the SCOBY mat:
/// `S / (S + S_half)`. Zero with no mat, approaching 1 as the mat grows.
pub fn barrier_block(scoby_size: f64, half_saturation: f64) -> f64 {
    if scoby_size <= 0.0 {
        return 0.0;
    }
    scoby_size / (scoby_size + half_saturation)
}

/// Competitive exclusion multiplier `1 / (1 + c · beneficial)`.
/// Returns 1.0 when `coefficient` is zero.
pub fn competition_factor(beneficial: f64, coefficient: f64) -> f64 {
    1.0 / (1.0 + coefficient * beneficial.max(0.0))
}
