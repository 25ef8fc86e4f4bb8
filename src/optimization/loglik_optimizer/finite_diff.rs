//! loglik_optimizer::finite_diff — finite-difference gradients.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate so the optimizer can fall back to numerical
//! gradients when an [`Objective`](super::Objective) has no analytic one,
//! and so tests can check analytic gradients against a numerical reference.
//!
//! Key behaviors
//! -------------
//! - [`central_fd_grad`] and [`forward_fd_grad`] evaluate a scalar function
//!   that cannot return `Result`; evaluation errors are routed through a
//!   shared `RefCell<Option<Error>>` slot and surfaced after differencing.
//! - Every returned gradient has passed [`validate_grad`].
//!
//! Conventions
//! -----------
//! - The closure is expected to store the first evaluation error in the slot
//!   and return `NaN`; both helpers clear the slot on entry.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Weights, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Central-difference gradient of `func` at `weights`.
///
/// # Errors
/// - The first error captured in `closure_err` during differencing.
/// - [`validate_grad`] failures (wrong length, non-finite entries).
pub fn central_fd_grad<G: Fn(&Weights) -> f64>(
    weights: &Weights, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let grad = weights.central_diff(func);
    finish(grad, weights.len(), closure_err)
}

/// Forward-difference gradient of `func` at `weights`.
///
/// Cheaper and one-sided; used as the fallback when the central scheme
/// fails validation.
///
/// # Errors
/// Same as [`central_fd_grad`].
pub fn forward_fd_grad<G: Fn(&Weights) -> f64>(
    weights: &Weights, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let grad = weights.forward_diff(func);
    finish(grad, weights.len(), closure_err)
}

fn finish(grad: Grad, dim: usize, closure_err: &RefCell<Option<Error>>) -> OptResult<Grad> {
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&grad, dim)?;
    Ok(grad)
}
