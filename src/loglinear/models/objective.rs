//! Expected complete-data log-likelihood and its analytic gradient.
//!
//! Purpose
//! -------
//! The M-step objective. Given expected counts `e(c, d)` from the E-step and
//! log-thetas `θ(c, d)` under candidate weights `w`:
//!
//! ```text
//! ECLL(w)  = Σ_{c,d} e(c,d) · θ(c,d)
//! m(c, d)  = e(c,d) − T(c) · exp θ(c,d),   T(c) = Σ_d e(c,d)
//! ∇ECLL[f] = Σ_{(c,d) : f active on (c,d)} m(c, d)
//! ```
//!
//! Key behaviors
//! -------------
//! - Zero counts contribute nothing to the value, even where `θ = -∞`.
//! - Contexts with `T(c) = 0` contribute nothing to the gradient.
//! - A feature listed twice on one pair receives the margin twice, matching
//!   its double contribution to the score.
//! - Sums run in ascending id order over the counts and the grid, so dense
//!   and sparse count rows give bit-identical results.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::check`] runs once before optimization and rejects weight
//!   vectors of the wrong length or with non-finite entries, counts built for
//!   another number of contexts, and positive counts on decisions the grid
//!   does not offer. Past that gate every `θ` touched by a positive count is
//!   finite.
//!
//! Downstream usage
//! ----------------
//! - The EM driver builds one [`ExpectedCompleteLikelihood`] per grid and
//!   hands it to the [`Minimizer`](super::em::Minimizer) with fresh counts on
//!   every iteration.
use crate::{
    loglinear::{
        core::{
            counts::ExpectedCounts,
            grid::FeatureGrid,
            theta::{LogThetas, compute_log_thetas},
        },
        errors::GridError,
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Grad, Objective, Weights, validation::validate_weights},
    },
};
use ndarray::Array1;

/// `Σ_{c,d} e(c,d) · θ(c,d)`, skipping zero counts.
pub fn expected_complete_loglik(thetas: &LogThetas, counts: &ExpectedCounts) -> f64 {
    let mut total = 0.0;
    for context in 0..counts.num_contexts() {
        for (decision, count) in counts.row(context) {
            if count == 0.0 {
                continue;
            }
            total += count * thetas.log_prob(context, decision);
        }
    }
    total
}

/// Gradient of [`expected_complete_loglik`] with respect to the weights.
pub fn expected_complete_gradient(
    grid: &FeatureGrid, thetas: &LogThetas, counts: &ExpectedCounts,
) -> Array1<f64> {
    let mut grad = Array1::zeros(grid.num_features());
    for context in 0..grid.num_contexts() {
        let total = counts.total(context);
        if total == 0.0 {
            continue;
        }
        for (decision, features) in grid.row(context) {
            let margin =
                counts.get(context, decision) - total * thetas.log_prob(context, decision).exp();
            for &f in features {
                grad[f] += margin;
            }
        }
    }
    grad
}

/// M-step objective over a fixed feature grid; the data are the expected
/// counts of one E-step.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedCompleteLikelihood<'g> {
    grid: &'g FeatureGrid,
}

impl<'g> ExpectedCompleteLikelihood<'g> {
    pub fn new(grid: &'g FeatureGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &FeatureGrid {
        self.grid
    }
}

impl Objective for ExpectedCompleteLikelihood<'_> {
    type Data = ExpectedCounts;

    /// Expected complete log-likelihood at `weights`.
    ///
    /// # Steps
    /// 1. Compute log-thetas for every context.
    /// 2. Accumulate `e · θ` over the non-zero counts.
    ///
    /// # Errors
    /// - Weight length mismatch, reported as
    ///   [`OptError::WeightDimMismatch`](crate::optimization::errors::OptError::WeightDimMismatch).
    fn value(&self, weights: &Weights, data: &Self::Data) -> OptResult<f64> {
        let thetas = compute_log_thetas(self.grid, weights)?;
        Ok(expected_complete_loglik(&thetas, data))
    }

    /// Validate weights and counts against the grid.
    ///
    /// # Behavior
    /// - `weights.len() == num_features` and every entry finite.
    /// - `counts.num_contexts() == num_contexts`.
    /// - No positive count on a decision absent from its context.
    ///
    /// # Errors
    /// The first violation, converted from [`GridError`] where applicable.
    fn check(&self, weights: &Weights, data: &Self::Data) -> OptResult<()> {
        validate_weights(weights, self.grid.num_features())?;
        if data.num_contexts() != self.grid.num_contexts() {
            return Err(GridError::CountsShapeMismatch {
                expected: self.grid.num_contexts(),
                found: data.num_contexts(),
            }
            .into());
        }
        for context in 0..data.num_contexts() {
            for (decision, count) in data.row(context) {
                if count > 0.0 && !self.grid.contains(context, decision) {
                    return Err(GridError::MassOnAbsentDecision { context, decision, count }.into());
                }
            }
        }
        Ok(())
    }

    /// Analytic gradient `∇ECLL(w)`; see the module docs for the margins.
    ///
    /// # Errors
    /// Same as [`value`](Objective::value).
    fn grad(&self, weights: &Weights, data: &Self::Data) -> OptResult<Grad> {
        let thetas = compute_log_thetas(self.grid, weights)?;
        Ok(expected_complete_gradient(self.grid, &thetas, data))
    }
}
