//! # Active Distance (Detection Range) Search
//!
//! The active distance of a vocalisation is the maximum propagation distance
//! at which its pressure still exceeds the background noise floor. Beyond
//! it the signal drowns in ambient sound and a recorder cannot pick it up.
//!
//! The search samples the composite attenuation model over a regular
//! distance grid and inspects the margin between the simulated pressure and
//! the background pressure at every grid point. Because the three-term
//! model does not guarantee a monotonic margin across arbitrary
//! frequencies, the boundary is not taken at the first sign change.
//! Instead, among the grid points where the margin is still positive, the
//! one closest to the zero crossing from above (the smallest positive
//! margin, first occurrence on ties) marks the active distance. When the
//! margin is positive at one grid point or none, the signal never
//! meaningfully clears the background and the active distance is 0.
//!
//! The scan is an explicit per-frequency loop so the selection rule stays
//! auditable.
//!
//! # Example
//!
//! ```
//! use earshot_core::active_space::{active_distance, SearchGrid};
//! use earshot_core::attenuation::PropagationModel;
//!
//! let model = PropagationModel::default();
//! // An 85 dB SPL song at 1 m against a 30 dB SPL noise floor
//! let result = active_distance(&model, 30.0, 85.0, 1000.0, SearchGrid::default()).unwrap();
//! let d = result.distance_m.scalar().unwrap();
//! assert!(d > 0.0 && d < 10_000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::attenuation::PropagationModel;
use crate::grid::{Axis, Grid};
use crate::spl::{pressure_from_level, P_REF};
use crate::types::{PropagationError, PropagationResult};

/// Distance sampling for the detection-range scan.
///
/// The grid runs from 1 m (skipping the `r = 0` singularity) up to, but
/// excluding, `max_distance_m` in steps of `step_m`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchGrid {
    /// Distance resolution (m).
    pub step_m: f64,
    /// Exclusive upper bound of the scan (m). Larger values lengthen the
    /// scan without changing results below the bound.
    pub max_distance_m: f64,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            step_m: 1.0,
            max_distance_m: 10_000.0,
        }
    }
}

/// Per-frequency detection ranges paired with their frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDistance {
    /// The frequency axis the search ran over (Hz).
    pub frequency_hz: Grid,
    /// Active distance per frequency (m); 0 when the signal never clears
    /// the background.
    pub distance_m: Grid,
}

/// Find the active distance for each frequency.
///
/// `background_level_db` and `source_level_db` are dB SPL (re 20 µPa); the
/// source level is anchored at the model's reference distance. The three
/// inputs must have equal length.
pub fn active_distance(
    model: &PropagationModel,
    background_level_db: impl Into<Axis>,
    source_level_db: impl Into<Axis>,
    frequency_hz: impl Into<Axis>,
    search: SearchGrid,
) -> PropagationResult<ActiveDistance> {
    let l_bkg = background_level_db.into();
    let l0 = source_level_db.into();
    let f = frequency_hz.into();

    f.ensure_non_empty("f")?;
    l_bkg.ensure_non_empty("L_bkg")?;
    l0.ensure_non_empty("L0")?;
    check_equal_len("f", &f, "L_bkg", &l_bkg)?;
    check_equal_len("f", &f, "L0", &l0)?;
    if !(search.step_m > 0.0) || !(search.max_distance_m > 0.0) {
        return Err(PropagationError::InvalidSearchGrid {
            step_m: search.step_m,
            max_distance_m: search.max_distance_m,
        });
    }

    let grid = distance_grid(&search);

    let mut distances = Vec::with_capacity(f.len());
    for i in 0..f.len() {
        let p0 = pressure_from_level(l0.values()[i], P_REF);
        let p_bkg = pressure_from_level(l_bkg.values()[i], P_REF);
        let factors = model.composite_factor_row(f.values()[i], &grid);

        // grid point with the smallest still-positive margin
        let mut positives = 0usize;
        let mut nearest: Option<(usize, f64)> = None;
        for (j, &a) in factors.iter().enumerate() {
            let margin = p0 * a - p_bkg;
            if margin > 0.0 {
                positives += 1;
                match nearest {
                    Some((_, m)) if margin >= m => {}
                    _ => nearest = Some((j, margin)),
                }
            }
        }

        match nearest {
            Some((j, _)) if positives > 1 => distances.push(grid[j]),
            _ => distances.push(0.0),
        }
    }

    Ok(ActiveDistance {
        frequency_hz: collapse(f.values().to_vec()),
        distance_m: collapse(distances),
    })
}

/// Sample distances `1, 1 + step, 1 + 2*step, ...` strictly below the bound.
fn distance_grid(search: &SearchGrid) -> Vec<f64> {
    let mut grid = Vec::new();
    let mut k = 0u64;
    loop {
        let d = 1.0 + k as f64 * search.step_m;
        if d >= search.max_distance_m {
            break;
        }
        grid.push(d);
        k += 1;
    }
    grid
}

fn check_equal_len(
    left: &'static str,
    a: &Axis,
    right: &'static str,
    b: &Axis,
) -> PropagationResult<()> {
    if a.len() != b.len() {
        return Err(PropagationError::LengthMismatch {
            left,
            left_len: a.len(),
            right,
            right_len: b.len(),
        });
    }
    Ok(())
}

fn collapse(values: Vec<f64>) -> Grid {
    if values.len() == 1 {
        Grid::Scalar(values[0])
    } else {
        Grid::Vector(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attenuation::{Environment, PropagationModel};

    // A loud song against a quiet floor carries a few hundred metres
    // under the default environment.
    #[test]
    fn test_plausible_detection_range() {
        let model = PropagationModel::default();
        let result =
            active_distance(&model, 30.0, 85.0, 1000.0, SearchGrid::default()).unwrap();
        let d = result.distance_m.scalar().unwrap();
        assert!(d > 0.0, "d={d}");
        assert!(d < 10_000.0, "d={d}");
        assert!(d > 200.0 && d < 350.0, "d={d}");
        assert_eq!(result.frequency_hz.scalar(), Some(1000.0));
    }

    #[test]
    fn test_higher_frequencies_carry_less_far() {
        let model = PropagationModel::default();
        let result = active_distance(
            &model,
            vec![30.0, 30.0, 30.0],
            vec![85.0, 85.0, 85.0],
            vec![1000.0, 4000.0, 8000.0],
            SearchGrid::default(),
        )
        .unwrap();
        let d = result.distance_m.values().to_vec();
        assert!(d[0] > d[1], "d={d:?}");
        assert!(d[1] > d[2], "d={d:?}");
        assert!(d[2] > 0.0, "d={d:?}");
    }

    // The margin never goes positive when the source is below the floor.
    #[test]
    fn test_inaudible_source_reports_zero() {
        let model = PropagationModel::default();
        let result =
            active_distance(&model, 85.0, 30.0, 1000.0, SearchGrid::default()).unwrap();
        assert_eq!(result.distance_m.scalar(), Some(0.0));
    }

    // A single positive grid point is not a usable range either.
    #[test]
    fn test_single_positive_point_reports_zero() {
        let model = PropagationModel::default();
        // 1 dB above the floor at 1 m, gone by 2 m (spreading alone is ~6 dB)
        let result =
            active_distance(&model, 30.0, 31.0, 1000.0, SearchGrid::default()).unwrap();
        assert_eq!(result.distance_m.scalar(), Some(0.0));
    }

    #[test]
    fn test_scalar_and_unit_vector_agree() {
        let model = PropagationModel::default();
        let scalar =
            active_distance(&model, 40.0, 90.0, 2000.0, SearchGrid::default()).unwrap();
        let wrapped = active_distance(
            &model,
            vec![40.0],
            vec![90.0],
            vec![2000.0],
            SearchGrid::default(),
        )
        .unwrap();
        assert_eq!(scalar, wrapped);
        assert!(scalar.distance_m.scalar().is_some());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let model = PropagationModel::default();
        let err = active_distance(
            &model,
            vec![30.0, 30.0],
            vec![85.0, 85.0, 85.0],
            vec![1000.0, 2000.0],
            SearchGrid::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PropagationError::LengthMismatch {
                left: "f",
                left_len: 2,
                right: "L0",
                right_len: 3,
            }
        );
    }

    #[test]
    fn test_invalid_search_grid_rejected() {
        let model = PropagationModel::default();
        let bad = SearchGrid {
            step_m: 0.0,
            max_distance_m: 10_000.0,
        };
        assert!(matches!(
            active_distance(&model, 30.0, 85.0, 1000.0, bad),
            Err(PropagationError::InvalidSearchGrid { .. })
        ));
    }

    // A finer grid refines the boundary rather than moving it.
    #[test]
    fn test_finer_step_stays_close() {
        let model = PropagationModel::default();
        let coarse = active_distance(&model, 30.0, 85.0, 1000.0, SearchGrid::default())
            .unwrap()
            .distance_m
            .scalar()
            .unwrap();
        let fine = active_distance(
            &model,
            30.0,
            85.0,
            1000.0,
            SearchGrid {
                step_m: 0.25,
                max_distance_m: 10_000.0,
            },
        )
        .unwrap()
        .distance_m
        .scalar()
        .unwrap();
        assert!((coarse - fine).abs() <= 1.0, "coarse={coarse}, fine={fine}");
    }

    // Habitat absorption shortens the range.
    #[test]
    fn test_denser_habitat_shortens_range() {
        let open = PropagationModel::new(
            Environment {
                habitat_coef: 0.0,
                ..Environment::default()
            },
            1.0,
        );
        let dense = PropagationModel::new(
            Environment {
                habitat_coef: 0.02,
                ..Environment::default()
            },
            1.0,
        );
        let d_open = active_distance(&open, 30.0, 85.0, 1000.0, SearchGrid::default())
            .unwrap()
            .distance_m
            .scalar()
            .unwrap();
        let d_dense = active_distance(&dense, 30.0, 85.0, 1000.0, SearchGrid::default())
            .unwrap()
            .distance_m
            .scalar()
            .unwrap();
        assert!(d_open > d_dense, "d_open={d_open}, d_dense={d_dense}");
        assert!(d_dense > 0.0, "d_dense={d_dense}");
    }
}
