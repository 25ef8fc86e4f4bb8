//! numerical_stability — log-space arithmetic shared by both halves of the crate.
//!
//! Purpose
//! -------
//! Provide the handful of log-domain primitives the theta computer, the
//! gradient engine and the chart posterior builder all rely on, with one
//! convention for the degenerate cases: an empty or all-`-∞` reduction is
//! `-∞`, never NaN.
//!
//! Key behaviors
//! -------------
//! - [`log_add`]: stable `ln(eᵃ + eᵇ)` for accumulating into a cell.
//! - [`log_sum_exp`] / [`log_sum_exp_iter`]: max-shifted reductions for row
//!   normalizers.
//! - [`PROB_TOL`]: tolerance for "sums to one" checks.
//!
//! Conventions
//! -----------
//! - Pure functions on `f64`; no allocation beyond what the caller passes in,
//!   no logging.
//! - `+∞` inputs are passed through (the result is `+∞`); NaN inputs are the
//!   caller's bug and propagate.

pub mod log_space;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::log_space::{PROB_TOL, log_add, log_sum_exp, log_sum_exp_iter};

pub mod prelude {
    pub use super::log_space::{PROB_TOL, log_add, log_sum_exp, log_sum_exp_iter};
}
