//! loglik_optimizer — argmin-backed L-BFGS for the EM M-step.
//!
//! Purpose
//! -------
//! Maximize a smooth objective `f(w)` over a dense weight vector. The EM
//! driver uses it to maximize the expected complete log-likelihood of a
//! log-linear grammar, but nothing here is specific to grammars.
//!
//! Key behaviors
//! -------------
//! - [`Objective`] is the single trait callers implement (`value`, `check`,
//!   optional `grad`).
//! - [`maximize`] validates the start point, wraps the objective in
//!   [`adapter::ArgMinAdapter`] (cost `-f`), builds an L-BFGS solver via
//!   [`builders`] and runs it via [`run::run_lbfgs`].
//! - Without an analytic gradient, [`finite_diff`] supplies a central (then
//!   forward) difference approximation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objective implementations report bad input as [`OptError`], never panic.
//! - [`OptimOptions`] and [`Tolerances`] are validated at construction.
//! - Outcomes always carry finite weights and a finite objective value.
//!
//! Conventions
//! -----------
//! - `value`/`grad` are expressed in objective space; the sign flip to cost
//!   space lives only in the adapter.
//! - [`OptimOutcome::value`] is `f(ŵ)`, not the cost.
//!
//! Testing notes
//! -------------
//! - Sign conventions and the finite-difference fallback: [`adapter`].
//! - Solver wiring: [`builders`], [`api`].
//! - End-to-end M-steps on log-linear objectives: `loglinear::models` and
//!   the integration tests.
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, Objective, OptimOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Weights};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, Objective, OptimOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Weights};
}
