//! Sound pressure level conversions.
//! - Pressure is a linear amplitude in Pascals, level is dB SPL.
//! - Amplitude semantics: 20*log10(·) to dB, /20 back to a ratio.
//! - Non-positive pressures are not guarded; they yield `-inf`/`NaN`
//!   per ordinary floating-point semantics.

/// Reference pressure for dB SPL in air: 20 µPa.
pub const P_REF: f64 = 20e-6;

/// Convert a sound pressure level (dB SPL) to a linear pressure (Pa).
#[inline]
pub fn pressure_from_level(level_db: f64, p_ref: f64) -> f64 {
    p_ref * 10.0_f64.powf(level_db / 20.0)
}

/// Convert a linear pressure (Pa) to a sound pressure level (dB SPL).
#[inline]
pub fn level_from_pressure(pressure_pa: f64, p_ref: f64) -> f64 {
    20.0 * (pressure_pa / p_ref).log10()
}

/// Spread a broadband level uniformly over `n_bins` frequency bins.
///
/// Energy splits evenly, so each bin carries `level_db - 10*log10(n_bins)`.
/// With a single bin the level passes through unchanged.
#[inline]
pub fn level_per_bin(level_db: f64, n_bins: usize) -> f64 {
    level_db - 10.0 * (n_bins as f64).log10()
}
