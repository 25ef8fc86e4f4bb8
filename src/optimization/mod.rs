//! optimization — inner optimizer, log-space numerics, and their error surface.
//!
//! Purpose
//! -------
//! Hold the numerical substrate shared by EM training and chart scoring:
//! an argmin-backed L-BFGS maximizer (`loglik_optimizer`), log-space
//! reductions (`numerical_stability`), and the optimizer error type
//! (`errors::OptError`).
//!
//! Conventions
//! -----------
//! - Objectives are maximized; the cost handed to argmin is `-f(w)`.
//! - Weight vectors and gradients are `ndarray::Array1<f64>` aliases.
//! - Backend failures never leak as raw argmin errors; they become
//!   `OptError` values.
//! - The numerical code does not log. With the `obs_slog` feature and
//!   `OptimOptions::verbose`, solver progress goes to argmin's slog
//!   observer and the starting point is reported through `log`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
