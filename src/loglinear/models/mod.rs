//! loglinear::models — M-step objective and EM driver.
pub mod em;
pub mod objective;

// ---- Re-exports ----
pub use self::em::{
    EmDriver, EmOptions, ExpectedCountsProvider, LbfgsMinimizer, Minimizer, State,
    weight_delta_norm,
};
pub use self::objective::{
    ExpectedCompleteLikelihood, expected_complete_gradient, expected_complete_loglik,
};
