//! Consistency checks shared by the optimizer entry points.
//!
//! - [`verify_tol_grad`] / [`verify_tol_cost`]: optional tolerances must be
//!   finite and strictly positive.
//! - [`validate_grad`]: gradient length and finiteness.
//! - [`validate_weights`]: weight vector length and finiteness, used by
//!   objectives in their `check` hook.
//! - [`validate_optimum`]: unwrap the solver's best point.
//! - [`validate_value`]: objective values must be finite.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Weights},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Validate a gradient against the expected dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] for the first non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Validate a weight vector passed into an objective.
///
/// # Errors
/// - [`OptError::WeightDimMismatch`] when `weights.len() != dim`.
/// - [`OptError::InvalidWeight`] for the first non-finite entry.
pub fn validate_weights(weights: &Weights, dim: usize) -> OptResult<()> {
    if weights.len() != dim {
        return Err(OptError::WeightDimMismatch { expected: dim, found: weights.len() });
    }
    match weights.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidWeight { index, value: weights[index] }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best point, rejecting missing or non-finite results.
///
/// # Errors
/// - [`OptError::MissingOptimum`] if argmin reported no best point.
/// - [`OptError::InvalidOptimum`] for the first non-finite entry.
pub fn validate_optimum(best: Option<Weights>) -> OptResult<Weights> {
    let best = best.ok_or(OptError::MissingOptimum)?;
    if let Some(index) = best.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidOptimum {
            index,
            value: best[index],
            reason: "Optimized weights must be finite.",
        });
    }
    Ok(best)
}

/// Validate that an objective value is finite.
///
/// # Errors
/// [`OptError::NonFiniteCost`] for NaN or ±∞.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Tolerances accept `None` and positive finite values only.
    fn tolerances_reject_non_positive_and_non_finite() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_grad(Some(1e-6)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // `validate_weights` reports the first offending index.
    //
    // Given
    // -----
    // - A weight vector with a NaN at index 1 and an infinity at index 2.
    //
    // Expect
    // ------
    // - `InvalidWeight { index: 1, .. }`.
    fn validate_weights_reports_first_non_finite_entry() {
        let w = array![0.5, f64::NAN, f64::INFINITY];
        match validate_weights(&w, 3) {
            Err(OptError::InvalidWeight { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected InvalidWeight, got {other:?}"),
        }
        assert!(matches!(
            validate_weights(&w, 4),
            Err(OptError::WeightDimMismatch { expected: 4, found: 3 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A missing optimum is an error, a finite one is returned unchanged.
    fn validate_optimum_unwraps_finite_points() {
        assert_eq!(validate_optimum(None), Err(OptError::MissingOptimum));
        let best = validate_optimum(Some(array![1.0, -2.0])).expect("finite optimum");
        assert_eq!(best, array![1.0, -2.0]);
    }
}
