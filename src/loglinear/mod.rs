//! loglinear — EM training of locally normalized log-linear grammars.
//!
//! Purpose
//! -------
//! Learn feature weights for a model in which every context (e.g. a parent
//! symbol) chooses among decisions (e.g. rule right-hand sides) with
//! probability `θ(c, d) ∝ exp Σ_{f active on (c,d)} w[f]`.
//!
//! Key behaviors
//! -------------
//! - `core`: key registries, the sparse feature grid, log-theta
//!   normalization and expected-count tables.
//! - `models`: the expected complete log-likelihood objective with its
//!   analytic gradient, and the pull-based [`EmDriver`](models::EmDriver).
//!
//! Conventions
//! -----------
//! - Keys (contexts, decisions, features) are caller types; everything
//!   internal is addressed by dense ids.
//! - Probabilities are kept in log space; an impossible event is `-∞`.
pub mod core;
pub mod errors;
pub mod models;

pub mod prelude {
    pub use super::core::{
        ExpectedCounts, FeatureGrid, FeatureSource, FeatureSpace, Index, LogThetas,
        compute_log_thetas,
    };
    pub use super::errors::{EmError, EmResult, GridError, GridResult};
    pub use super::models::{
        EmDriver, EmOptions, ExpectedCompleteLikelihood, ExpectedCountsProvider, LbfgsMinimizer,
        Minimizer, State, weight_delta_norm,
    };
}
