//! # Earshot Core: Bioacoustic Propagation Modelling
//!
//! This crate predicts how animal sounds decay as they travel through air,
//! and what that decay implies for passive acoustic monitoring: how far away
//! a recorder can still pick a call out of the background, and how loud the
//! animal really was given a reading taken at range.
//!
//! Three physical mechanisms are modelled and composed:
//!
//! - **Geometric spreading**: spherical wavefront expansion, `r0 / r`
//! - **Atmospheric absorption**: molecular relaxation losses in air,
//!   dependent on frequency, temperature, humidity and pressure
//! - **Habitat absorption**: empirical vegetation/ground losses, linear in
//!   frequency
//!
//! On top of the composite model the crate provides:
//!
//! - **Active distance**: the detection-range boundary where the simulated
//!   pressure drops to the background noise floor
//! - **Source level estimation**: back-projection of a measurement at range
//!   to the reference distance
//! - **Waveform attenuation**: FFT-domain application of the model to a
//!   sampled signal
//!
//! All quantities are evaluated over scalar-or-vector frequency and
//! distance axes; results collapse degenerate axes so scalar questions get
//! scalar answers.
//!
//! ## Example
//!
//! ```
//! use earshot_core::{active_distance, PropagationModel, SearchGrid};
//!
//! let model = PropagationModel::default();
//!
//! // How far does an 85 dB SPL song carry over a 30 dB SPL noise floor?
//! let result = active_distance(&model, 30.0, 85.0, 1000.0, SearchGrid::default()).unwrap();
//! let range_m = result.distance_m.scalar().unwrap();
//! assert!(range_m > 100.0 && range_m < 1000.0);
//! ```

pub mod active_space;
pub mod attenuation;
pub mod grid;
pub mod source_level;
pub mod spl;
pub mod types;
pub mod waveform;

// Re-export the main types
pub use active_space::{active_distance, ActiveDistance, SearchGrid};
pub use attenuation::{AttenuationBreakdown, AttenuationRecord, Environment, PropagationModel};
pub use grid::{Axis, Grid, Matrix};
pub use source_level::{level_at_reference, pressure_at_reference};
pub use spl::{level_from_pressure, level_per_bin, pressure_from_level, P_REF};
pub use types::{PropagationError, PropagationResult, Sample, SampleBuffer};
pub use waveform::apply_attenuation;
