//! # Propagation Attenuation Model
//!
//! Predicts how the pressure of an airborne sound decays between a reference
//! distance and an arbitrary propagation distance, combining the three
//! mechanisms that dominate outdoor bioacoustic transmission:
//!
//! - **Geometric spreading**: spherical wavefront expansion from a point
//!   source, a frequency-independent `r0 / r` pressure ratio.
//! - **Atmospheric absorption**: molecular relaxation losses in air
//!   (ISO 9613-1 style closed form), governed by frequency, temperature,
//!   relative humidity and ambient pressure.
//! - **Habitat absorption**: empirical losses from vegetation and ground,
//!   linear in frequency with a single habitat coefficient.
//!
//! Each mechanism is available as a linear pressure factor (multiply with the
//! reference pressure) and in dB (subtract from the reference level). The
//! composite model is the product of the three factors, or equivalently the
//! sum of the three dB terms, evaluated on the outer product of a frequency
//! axis and a distance axis.
//!
//! # Example
//!
//! ```
//! use earshot_core::attenuation::PropagationModel;
//!
//! let model = PropagationModel::default();
//!
//! // Total attenuation of a 2 kHz call between 1 m and 100 m
//! let report = model.attenuation_db(2000.0, 100.0).unwrap();
//! let total = report.total_db.scalar().unwrap();
//! assert!(total > 40.0, "spreading alone gives 40 dB over 1 m -> 100 m");
//!
//! // The same model as a linear pressure multiplier
//! let factor = model.attenuation_factor(2000.0, 100.0).unwrap();
//! assert!(factor.scalar().unwrap() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::{Axis, Grid, Matrix};
use crate::types::PropagationResult;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Reference ambient atmospheric pressure: 101.325 kPa.
const REF_PRESSURE_PA: f64 = 101.325e3;

/// Triple-point isotherm temperature: 273.16 K.
const TRIPLE_POINT_K: f64 = 273.16;

/// Reference air temperature: 293.15 K (20 °C).
const REF_TEMPERATURE_K: f64 = 293.15;

/// 0 °C in Kelvin.
const CELSIUS_OFFSET_K: f64 = 273.15;

/// Neper to decibel scale: 20·log10(e) ≈ 8.6859.
const NEPER_TO_DB: f64 = 20.0 * std::f64::consts::LOG10_E;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Environmental parameters governing atmospheric and habitat absorption.
///
/// The defaults describe a temperate recording session: 20 °C, 60 %
/// relative humidity, standard sea-level pressure and a lightly vegetated
/// habitat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub relative_humidity_pct: f64,
    /// Ambient atmospheric pressure (Pa).
    pub pressure_pa: f64,
    /// Habitat attenuation coefficient (Neper per kHz per metre).
    pub habitat_coef: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            relative_humidity_pct: 60.0,
            pressure_pa: 101_325.0,
            habitat_coef: 0.002,
        }
    }
}

// ---------------------------------------------------------------------------
// Breakdown records
// ---------------------------------------------------------------------------

/// One (frequency, distance) row of the attenuation breakdown table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationRecord {
    /// Frequency (Hz).
    pub frequency_hz: f64,
    /// Propagation distance (m).
    pub distance_m: f64,
    /// Geometric spreading loss (dB).
    pub geometric_db: f64,
    /// Atmospheric absorption loss (dB).
    pub atmospheric_db: f64,
    /// Habitat absorption loss (dB).
    pub habitat_db: f64,
    /// Total attenuation (dB).
    pub total_db: f64,
}

/// Total dB attenuation plus its long-form per-pair breakdown.
///
/// Records are ordered frequency-major: all distances of the first
/// frequency, then all distances of the second, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct AttenuationBreakdown {
    /// Total attenuation (dB) over the frequency × distance grid.
    pub total_db: Grid,
    /// One record per (frequency, distance) pair.
    pub records: Vec<AttenuationRecord>,
}

// ---------------------------------------------------------------------------
// PropagationModel
// ---------------------------------------------------------------------------

/// Composite attenuation model anchored at a reference distance.
///
/// The model is pure: the same frequencies, distances, reference distance
/// and environment always produce the same output. A zero distance is not
/// guarded against and yields `inf`/`NaN` through the `r0 / r` spreading
/// term, per ordinary floating-point semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    env: Environment,
    ref_distance_m: f64,
}

impl Default for PropagationModel {
    /// Default environment, source level anchored at 1 m.
    fn default() -> Self {
        Self::new(Environment::default(), 1.0)
    }
}

impl PropagationModel {
    /// Create a model for the given environment and reference distance (m).
    pub fn new(env: Environment, ref_distance_m: f64) -> Self {
        Self {
            env,
            ref_distance_m,
        }
    }

    /// The environmental parameters.
    pub fn environment(&self) -> Environment {
        self.env
    }

    /// The reference distance (m) at which source pressure is defined.
    pub fn ref_distance_m(&self) -> f64 {
        self.ref_distance_m
    }

    // -----------------------------------------------------------------------
    // Absorption coefficients (per-frequency scalars)
    // -----------------------------------------------------------------------

    /// Atmospheric absorption coefficient (dB/m) at `frequency_hz`.
    ///
    /// Two-term molecular relaxation form: saturation vapour pressure from
    /// an empirical exponential in temperature, molar water vapour
    /// concentration, oxygen and nitrogen relaxation frequencies, then the
    /// classical-plus-relaxation absorption sum scaled by 8.686 to dB.
    pub fn atmospheric_coef_db_per_m(&self, frequency_hz: f64) -> f64 {
        let t_k = self.env.temperature_c + CELSIUS_OFFSET_K;
        let pa = self.env.pressure_pa;
        let p_ratio = pa / REF_PRESSURE_PA;

        let psat =
            REF_PRESSURE_PA * 10.0_f64.powf(-6.8346 * (TRIPLE_POINT_K / t_k).powf(1.261) + 4.6151);
        // molar concentration of water vapour, as a percentage
        let h = self.env.relative_humidity_pct * (psat / pa);

        // oxygen and nitrogen relaxation frequencies
        let fr_o = p_ratio * (24.0 + 4.04e4 * h * ((0.02 + h) / (0.391 + h)));
        let fr_n = p_ratio
            * (t_k / REF_TEMPERATURE_K).sqrt()
            * (9.0 + 280.0 * h * (-4.170 * ((t_k / REF_TEMPERATURE_K).powf(-1.0 / 3.0) - 1.0)).exp());

        let f2 = frequency_hz * frequency_hz;
        let z = 0.1068 * (-3352.0 / t_k).exp() / (fr_n + f2 / fr_n);
        let y = (t_k / REF_TEMPERATURE_K).powf(-5.0 / 2.0)
            * (0.01275 * (-2239.1 / t_k).exp() / (fr_o + f2 / fr_o) + z);

        8.686 * f2 * ((1.84e-11 * (1.0 / p_ratio) * (t_k / REF_TEMPERATURE_K).sqrt()) + y)
    }

    /// Atmospheric absorption coefficient (Neper/m) at `frequency_hz`.
    pub fn atmospheric_coef_np_per_m(&self, frequency_hz: f64) -> f64 {
        self.atmospheric_coef_db_per_m(frequency_hz) / NEPER_TO_DB
    }

    /// Habitat absorption coefficient (Neper/m) at `frequency_hz`.
    ///
    /// Linear in frequency: the habitat coefficient is expressed per kHz.
    pub fn habitat_coef_np_per_m(&self, frequency_hz: f64) -> f64 {
        self.env.habitat_coef * frequency_hz / 1000.0
    }

    /// Habitat absorption coefficient (dB/m) at `frequency_hz`.
    pub fn habitat_coef_db_per_m(&self, frequency_hz: f64) -> f64 {
        self.habitat_coef_np_per_m(frequency_hz) * NEPER_TO_DB
    }

    // -----------------------------------------------------------------------
    // Geometric spreading
    // -----------------------------------------------------------------------

    /// Spherical spreading pressure factor `r0 / r` over the distance axis.
    ///
    /// Values below 1 attenuate; distances short of the reference distance
    /// amplify instead (the factor exceeds 1 going "backwards").
    pub fn geometric_factor(&self, r: impl Into<Axis>) -> PropagationResult<Grid> {
        let r = r.into();
        r.ensure_non_empty("r")?;
        Ok(Grid::squeeze(Matrix::outer(
            &[1.0],
            &self.geometric_factors(r.values()),
        )))
    }

    /// Spherical spreading loss in dB over the distance axis.
    pub fn geometric_db(&self, r: impl Into<Axis>) -> PropagationResult<Grid> {
        let r = r.into();
        r.ensure_non_empty("r")?;
        Ok(Grid::squeeze(Matrix::outer(
            &[1.0],
            &self.geometric_db_values(r.values()),
        )))
    }

    fn geometric_factors(&self, distances: &[f64]) -> Vec<f64> {
        distances.iter().map(|&r| self.ref_distance_m / r).collect()
    }

    fn geometric_db_values(&self, distances: &[f64]) -> Vec<f64> {
        self.geometric_factors(distances)
            .into_iter()
            .map(|a| -20.0 * a.log10())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Atmospheric and habitat grids
    // -----------------------------------------------------------------------

    /// Atmospheric absorption pressure factor over frequency × distance.
    pub fn atmospheric_factor(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<Grid> {
        let (f, r) = self.checked_axes(f, r)?;
        let coefs = self.map_freqs(&f, |m, fi| m.atmospheric_coef_np_per_m(fi));
        Ok(Grid::squeeze(self.decay_matrix(&coefs, r.values())))
    }

    /// Atmospheric absorption in dB over frequency × distance.
    pub fn atmospheric_db(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<Grid> {
        let (f, r) = self.checked_axes(f, r)?;
        let coefs = self.map_freqs(&f, |m, fi| m.atmospheric_coef_db_per_m(fi));
        Ok(Grid::squeeze(Matrix::outer(
            &coefs,
            &self.excess_distances(r.values()),
        )))
    }

    /// Habitat absorption pressure factor over frequency × distance.
    pub fn habitat_factor(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<Grid> {
        let (f, r) = self.checked_axes(f, r)?;
        let coefs = self.map_freqs(&f, |m, fi| m.habitat_coef_np_per_m(fi));
        Ok(Grid::squeeze(self.decay_matrix(&coefs, r.values())))
    }

    /// Habitat absorption in dB over frequency × distance.
    pub fn habitat_db(&self, f: impl Into<Axis>, r: impl Into<Axis>) -> PropagationResult<Grid> {
        let (f, r) = self.checked_axes(f, r)?;
        let coefs = self.map_freqs(&f, |m, fi| m.habitat_coef_db_per_m(fi));
        Ok(Grid::squeeze(Matrix::outer(
            &coefs,
            &self.excess_distances(r.values()),
        )))
    }

    // -----------------------------------------------------------------------
    // Composite model
    // -----------------------------------------------------------------------

    /// Composite pressure factor: geometric × atmospheric × habitat.
    ///
    /// Multiply with the reference pressure at `r0` to obtain the pressure
    /// after propagation, per frequency row and distance column.
    pub fn attenuation_factor(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<Grid> {
        let (f, r) = self.checked_axes(f, r)?;
        Ok(Grid::squeeze(
            self.composite_factor_matrix(f.values(), r.values()),
        ))
    }

    /// Total attenuation in dB plus the per-pair component breakdown.
    ///
    /// The total is the elementwise sum of the geometric, atmospheric and
    /// habitat terms; the records tile the per-axis vectors onto the full
    /// grid so every row of the table is self-describing.
    pub fn attenuation_db(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<AttenuationBreakdown> {
        let (f, r) = self.checked_axes(f, r)?;
        let freqs = f.values();
        let dists = r.values();

        let geo_db = self.geometric_db_values(dists);
        let atm_coefs = self.map_freqs(&f, |m, fi| m.atmospheric_coef_db_per_m(fi));
        let hab_coefs = self.map_freqs(&f, |m, fi| m.habitat_coef_db_per_m(fi));
        let excess = self.excess_distances(dists);

        let atm_db = Matrix::outer(&atm_coefs, &excess);
        let hab_db = Matrix::outer(&hab_coefs, &excess);
        let total = atm_db
            .clone()
            .add_elementwise(&hab_db)
            .add_columns(&geo_db);

        let mut records = Vec::with_capacity(freqs.len() * dists.len());
        for (i, &fi) in freqs.iter().enumerate() {
            for (j, &rj) in dists.iter().enumerate() {
                records.push(AttenuationRecord {
                    frequency_hz: fi,
                    distance_m: rj,
                    geometric_db: geo_db[j],
                    atmospheric_db: atm_db.get(i, j),
                    habitat_db: hab_db.get(i, j),
                    total_db: total.get(i, j),
                });
            }
        }

        Ok(AttenuationBreakdown {
            total_db: Grid::squeeze(total),
            records,
        })
    }

    /// Composite pressure factor for one frequency over a distance slice.
    ///
    /// The per-frequency path used by the active-distance scan; numerically
    /// identical to one row of [`PropagationModel::attenuation_factor`].
    pub(crate) fn composite_factor_row(&self, frequency_hz: f64, distances: &[f64]) -> Vec<f64> {
        let atm = self.atmospheric_coef_np_per_m(frequency_hz);
        let hab = self.habitat_coef_np_per_m(frequency_hz);
        let r0 = self.ref_distance_m;
        distances
            .iter()
            .map(|&r| (r0 / r) * (-(atm * (r - r0))).exp() * (-(hab * (r - r0))).exp())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn checked_axes(
        &self,
        f: impl Into<Axis>,
        r: impl Into<Axis>,
    ) -> PropagationResult<(Axis, Axis)> {
        let f = f.into();
        let r = r.into();
        f.ensure_non_empty("f")?;
        r.ensure_non_empty("r")?;
        Ok((f, r))
    }

    fn map_freqs(&self, f: &Axis, coef: impl Fn(&Self, f64) -> f64) -> Vec<f64> {
        f.values().iter().map(|&fi| coef(self, fi)).collect()
    }

    fn excess_distances(&self, distances: &[f64]) -> Vec<f64> {
        distances.iter().map(|&r| r - self.ref_distance_m).collect()
    }

    fn decay_matrix(&self, coefs_np: &[f64], distances: &[f64]) -> Matrix {
        Matrix::outer(coefs_np, &self.excess_distances(distances)).map(|x| (-x).exp())
    }

    fn composite_factor_matrix(&self, freqs: &[f64], distances: &[f64]) -> Matrix {
        let atm_coefs: Vec<f64> = freqs
            .iter()
            .map(|&fi| self.atmospheric_coef_np_per_m(fi))
            .collect();
        let hab_coefs: Vec<f64> = freqs
            .iter()
            .map(|&fi| self.habitat_coef_np_per_m(fi))
            .collect();
        let atm = self.decay_matrix(&atm_coefs, distances);
        let hab = self.decay_matrix(&hab_coefs, distances);
        atm.mul_elementwise(&hab)
            .mul_columns(&self.geometric_factors(distances))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
