//! Bridges an [`Objective`] to argmin's `CostFunction`/`Gradient` traits.
//!
//! argmin minimizes, so the cost is `c(w) = -f(w)` and an analytic gradient is
//! negated. Without an analytic gradient the cost itself is differenced, so
//! that branch needs no sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::{central_fd_grad, forward_fd_grad},
        traits::Objective,
        types::{Cost, Grad, Weights},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Borrowed `(objective, data)` pair handed to argmin's executor.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<F: Objective> CostFunction for ArgMinAdapter<'_, F> {
    type Param = Weights;
    type Output = Cost;

    /// `-f(w)`; a non-finite objective is reported as
    /// [`OptError::NonFiniteCost`] so line searches back off.
    fn cost(&self, weights: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(weights, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(-value)
    }
}

impl<F: Objective> Gradient for ArgMinAdapter<'_, F> {
    type Param = Weights;
    type Gradient = Grad;

    /// Gradient of the cost.
    ///
    /// - Analytic: validate `∇f(w)` and return `-∇f(w)`.
    /// - Missing: central differences of the cost, retried with forward
    ///   differences when the central result fails validation or a cost
    ///   evaluation errored.
    fn gradient(&self, weights: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(weights, self.data) {
            Ok(g) => {
                validate_grad(&g, weights.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost = |w: &Weights| -> f64 {
                    self.cost(w).unwrap_or_else(|e| {
                        closure_err.borrow_mut().get_or_insert(e);
                        f64::NAN
                    })
                };
                match central_fd_grad(weights, &cost, &closure_err) {
                    Ok(g) => Ok(g),
                    Err(_) => Ok(forward_fd_grad(weights, &cost, &closure_err)?),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
