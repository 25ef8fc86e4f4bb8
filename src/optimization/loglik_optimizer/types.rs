//! loglik_optimizer::types — numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Keep the `ndarray`/argmin generics in one place so the objective, the EM
//! driver and the solver builders agree on a single set of numeric shapes.
//!
//! Conventions
//! -----------
//! - [`Weights`] and [`Grad`] are dense vectors indexed by feature id.
//! - [`Cost`] is the scalar handed to argmin, i.e. the *negated* objective.
//! - The L-BFGS aliases pair argmin's line searches with these shapes.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Feature-weight vector, one entry per feature id.
pub type Weights = Array1<f64>;

/// Gradient vector with the same layout as [`Weights`].
pub type Grad = Array1<f64>;

/// Scalar cost minimized by argmin (`-objective`).
pub type Cost = f64;

/// Function-evaluation counters reported by argmin (`"cost_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search over the crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Weights, Grad, Cost>;

/// More–Thuente line search over the crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Weights, Grad, Cost>;

/// L-BFGS with Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Weights, Grad, Cost>;

/// L-BFGS with More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Weights, Grad, Cost>;
