//! Core types for acoustic propagation modelling
//!
//! This module defines the fundamental aliases and the error type used
//! throughout the crate. All physical quantities are carried as `f64`:
//! pressures in Pascals, levels in dB SPL, frequencies in Hz and
//! distances in metres.

/// A real-valued sample (pressure in Pa for time-domain signals).
pub type Sample = f64;

/// A buffer of real-valued samples.
pub type SampleBuffer = Vec<Sample>;

/// Result type for propagation operations.
pub type PropagationResult<T> = Result<T, PropagationError>;

/// Errors raised by contract checks before any computation starts.
///
/// Numeric-domain edge cases (a zero distance, the logarithm of a
/// non-positive pressure) are deliberately NOT represented here. They
/// propagate as `inf`/`NaN` per IEEE-754, since callers are expected to
/// supply physically valid positive distances and pressures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    #[error("Length mismatch: {left} has {left_len} elements but {right} has {right_len}. Paired vectors must have equal length")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("Empty input: {0} must contain at least one element")]
    EmptyInput(&'static str),

    #[error("Invalid search grid: step {step_m} m and maximum distance {max_distance_m} m must both be positive")]
    InvalidSearchGrid { step_m: f64, max_distance_m: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offending_inputs() {
        let err = PropagationError::LengthMismatch {
            left: "r",
            left_len: 3,
            right: "p",
            right_len: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("r has 3"), "msg={msg}");
        assert!(msg.contains("p has 2"), "msg={msg}");

        let err = PropagationError::EmptyInput("f");
        assert!(err.to_string().contains('f'));
    }
}
