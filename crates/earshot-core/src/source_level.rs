//! # Source Level Estimation
//!
//! Back-projects a pressure (or level) measured at some distance to the
//! model's reference distance by multiplying with the reciprocal of each
//! attenuation factor. This recovers what a calibrated recorder would have
//! read right next to the animal from a measurement taken at range.
//!
//! Measurements pair with distances: when `r` and `p` are both vectors they
//! must have equal length, one reading per distance. A single distance with
//! several readings is also accepted, one reading per frequency.
//!
//! # Example
//!
//! ```
//! use earshot_core::attenuation::PropagationModel;
//! use earshot_core::source_level::{level_at_reference, pressure_at_reference};
//! use earshot_core::spl::P_REF;
//!
//! let model = PropagationModel::default();
//!
//! // 52 dB SPL measured 80 m from a songbird
//! let l0 = level_at_reference(&model, 4000.0, 80.0, 52.0, P_REF).unwrap();
//! assert!(l0.scalar().unwrap() > 52.0, "the source is louder than the reading");
//! ```

use crate::attenuation::PropagationModel;
use crate::grid::{Axis, Grid, Matrix};
use crate::spl::{level_from_pressure, pressure_from_level};
use crate::types::{PropagationError, PropagationResult};

/// Estimate the pressure (Pa) at the reference distance from pressures
/// measured at distance `r`.
///
/// The measured pressure is divided by the geometric, atmospheric and
/// habitat factors in turn. The result follows the usual shape collapsing:
/// scalar inputs give a scalar, a vector of paired `(r, p)` readings gives
/// a vector, and a frequency vector against a distance vector gives a
/// frequency × distance matrix.
pub fn pressure_at_reference(
    model: &PropagationModel,
    frequency_hz: impl Into<Axis>,
    distance_m: impl Into<Axis>,
    pressure_pa: impl Into<Axis>,
) -> PropagationResult<Grid> {
    let f = frequency_hz.into();
    let r = distance_m.into();
    let p = pressure_pa.into();

    f.ensure_non_empty("f")?;
    r.ensure_non_empty("r")?;
    p.ensure_non_empty("p")?;

    let n_f = f.len();
    let n_r = r.len();
    let n_p = p.len();

    if n_r > 1 && n_p > 1 && n_r != n_p {
        return Err(PropagationError::LengthMismatch {
            left: "r",
            left_len: n_r,
            right: "p",
            right_len: n_p,
        });
    }
    if n_r == 1 && n_p > 1 && n_p != n_f {
        return Err(PropagationError::LengthMismatch {
            left: "f",
            left_len: n_f,
            right: "p",
            right_len: n_p,
        });
    }

    let geo = model.geometric_factor(r.clone())?;
    let atm = model.atmospheric_factor(f.clone(), r.clone())?;
    let hab = model.habitat_factor(f, r)?;

    // one reading for all cells, one per distance column, or one per
    // frequency row (single-distance case)
    let p_at = |i: usize, j: usize| -> f64 {
        if n_p == 1 {
            p.values()[0]
        } else if n_p == n_r {
            p.values()[j]
        } else {
            p.values()[i]
        }
    };

    let data = if geo.len() == atm.len() {
        // Same total size: the grids are distance-shaped, so the factors
        // divide out elementwise.
        let mut out = Vec::with_capacity(n_r);
        for j in 0..n_r {
            out.push(
                p_at(0, j)
                    * geo.values()[j].recip()
                    * atm.values()[j].recip()
                    * hab.values()[j].recip(),
            );
        }
        out
    } else {
        // Distance-only spreading against a frequency × distance grid: the
        // geometric factor stretches across the frequency rows.
        let mut out = Vec::with_capacity(n_f * n_r);
        for i in 0..n_f {
            for j in 0..n_r {
                out.push(
                    p_at(i, j)
                        * geo.values()[j].recip()
                        * atm.values()[i * n_r + j].recip()
                        * hab.values()[i * n_r + j].recip(),
                );
            }
        }
        out
    };

    let rows = data.len() / n_r;
    Ok(Grid::squeeze(Matrix::from_data(rows, n_r, data)))
}

/// Estimate the sound pressure level (dB SPL) at the reference distance
/// from levels measured at distance `r`.
///
/// Levels convert to pressure and back with the same reference pressure
/// `p_ref`; pass [`crate::spl::P_REF`] for standard dB SPL in air.
pub fn level_at_reference(
    model: &PropagationModel,
    frequency_hz: impl Into<Axis>,
    distance_m: impl Into<Axis>,
    level_db: impl Into<Axis>,
    p_ref: f64,
) -> PropagationResult<Grid> {
    let level = level_db.into();
    let pressures: Vec<f64> = level
        .values()
        .iter()
        .map(|&l| pressure_from_level(l, p_ref))
        .collect();
    let p0 = pressure_at_reference(model, frequency_hz, distance_m, pressures)?;
    Ok(p0.map(|p| level_from_pressure(p, p_ref)))
}
