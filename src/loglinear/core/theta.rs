//! Log-thetas — per-context log-probabilities over decisions.
//!
//! For every context row of the feature grid, each present decision gets the
//! linear score `Σ weight[f]` over its features; the row is then normalized
//! with a max-shifted log-sum-exp. Decisions absent from the grid keep `-∞`.
//! A row with no present decision stays entirely `-∞`: the context is
//! degenerate ("impossible"), which is not an error.
//!
//! The computation is a pure function of `(grid, weights)` and visits rows,
//! decisions and features in ascending id order, so two runs with the same
//! inputs are bit-identical.
use crate::{
    loglinear::{
        core::grid::FeatureGrid,
        errors::{GridError, GridResult},
    },
    optimization::numerical_stability::log_sum_exp_iter,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Dense `contexts × decisions` table of log-probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct LogThetas {
    values: Array2<f64>,
}

impl LogThetas {
    /// Wrap a precomputed table. Rows are taken as given.
    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn num_contexts(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_decisions(&self) -> usize {
        self.values.ncols()
    }

    /// `log P(decision | context)`; `-∞` for ids outside the table.
    pub fn log_prob(&self, context: usize, decision: usize) -> f64 {
        self.values.get((context, decision)).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Row view for `context`, `None` when out of range.
    pub fn row(&self, context: usize) -> Option<ArrayView1<'_, f64>> {
        (context < self.values.nrows()).then(|| self.values.row(context))
    }

    /// `true` when no decision of `context` has finite probability.
    pub fn is_degenerate(&self, context: usize) -> bool {
        self.row(context).is_none_or(|row| row.iter().all(|v| *v == f64::NEG_INFINITY))
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Compute log-thetas for every context of `grid` under `weights`.
///
/// # Errors
/// [`GridError::WeightDimMismatch`] when `weights.len() != grid.num_features()`.
pub fn compute_log_thetas(grid: &FeatureGrid, weights: &Array1<f64>) -> GridResult<LogThetas> {
    if weights.len() != grid.num_features() {
        return Err(GridError::WeightDimMismatch {
            expected: grid.num_features(),
            found: weights.len(),
        });
    }
    let shape = (grid.num_contexts(), grid.num_decisions());
    let mut values = Array2::from_elem(shape, f64::NEG_INFINITY);
    for (context, mut out) in values.axis_iter_mut(Axis(0)).enumerate() {
        let scores: Vec<(usize, f64)> = grid
            .row(context)
            .map(|(decision, features)| (decision, features.iter().map(|&f| weights[f]).sum()))
            .collect();
        let log_z = log_sum_exp_iter(scores.iter().map(|(_, s)| *s));
        if log_z == f64::NEG_INFINITY {
            continue;
        }
        for (decision, score) in scores {
            out[decision] = score - log_z;
        }
    }
    Ok(LogThetas { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::numerical_stability::{PROB_TOL, log_sum_exp_iter};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// Context 0: decisions {0: [f0], 1: [f1, f2], 2: []}. Context 1: empty.
    /// Context 2: decision 1 only.
    fn toy_grid() -> FeatureGrid {
        let mut builder = FeatureGrid::builder(3, 3, 3);
        builder.insert(0, 0, vec![0]).expect("valid");
        builder.insert(0, 1, vec![2, 1]).expect("valid");
        builder.insert(0, 2, vec![]).expect("valid");
        builder.insert(2, 1, vec![0, 0]).expect("valid");
        builder.build().expect("valid")
    }

    #[test]
    // Purpose
    // -------
    // Every row either normalizes to one or is degenerate.
    //
    // Given
    // -----
    // - `toy_grid()` and weights (0.5, -1.0, 2.0).
    //
    // Expect
    // ------
    // - Rows 0 and 2 sum to 1 in probability space; row 1 is all `-∞`.
    // - The explicitly empty decision scores 0 before normalization.
    // - Duplicate feature ids each contribute their weight.
    fn rows_normalize_or_are_degenerate() {
        // Arrange
        let grid = toy_grid();
        let w = array![0.5, -1.0, 2.0];

        // Act
        let thetas = compute_log_thetas(&grid, &w).expect("dims match");

        // Assert
        for context in [0, 2] {
            let row = thetas.row(context).expect("in range");
            let total = log_sum_exp_iter(row.iter().copied()).exp();
            assert_abs_diff_eq!(total, 1.0, epsilon = PROB_TOL);
        }
        assert!(thetas.is_degenerate(1));
        assert!(!thetas.is_degenerate(0));
        let expected_z = (0.5f64.exp() + 1.0f64.exp() + 1.0).ln();
        assert_abs_diff_eq!(thetas.log_prob(0, 2), -expected_z, epsilon = 1e-12);
        assert_abs_diff_eq!(thetas.log_prob(2, 1), 0.0, epsilon = 1e-12);
        assert_eq!(thetas.log_prob(2, 0), f64::NEG_INFINITY);
        assert_eq!(thetas.log_prob(9, 0), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Repeated computations are bit-identical.
    fn repeated_computation_is_bit_identical() {
        let grid = toy_grid();
        let w = array![0.1234, -7.5, 3.25];
        let a = compute_log_thetas(&grid, &w).expect("dims match");
        let b = compute_log_thetas(&grid, &w).expect("dims match");
        let bits = |t: &LogThetas| t.as_array().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    // Purpose
    // -------
    // Large weights do not overflow thanks to the max shift.
    fn extreme_weights_stay_finite() {
        let grid = toy_grid();
        let w = array![800.0, 750.0, 10.0];
        let thetas = compute_log_thetas(&grid, &w).expect("dims match");
        assert!(thetas.log_prob(0, 0).is_finite());
        assert!(thetas.log_prob(0, 1).is_finite());
        assert!(thetas.as_array().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn wrong_weight_length_is_rejected() {
        let err = compute_log_thetas(&toy_grid(), &array![1.0]).unwrap_err();
        assert_eq!(err, GridError::WeightDimMismatch { expected: 3, found: 1 });
    }
}
