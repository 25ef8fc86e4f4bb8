//! loglinear_grammar — EM training of log-linear grammars and chart posteriors.
//!
//! Purpose
//! -------
//! Provide the numerical core of a statistical parsing pipeline:
//! (a) fitting the feature weights of a locally normalized log-linear model
//! over `(context, decision)` pairs by expectation-maximization with an
//! L-BFGS M-step, and (b) turning the inside/outside charts of a parse into
//! span-anchored posterior scores used to bias or prune later passes.
//!
//! Key behaviors
//! -------------
//! - `loglinear`: key registries, the sparse feature grid, log-thetas, the
//!   expected complete log-likelihood with its analytic gradient, and the
//!   pull-based EM driver.
//! - `chart`: triangular span addressing, the posterior builder, the
//!   immutable `AnchoredRuleScorer`, and rayon batch scoring.
//! - `optimization`: the argmin-backed maximizer and log-space reductions
//!   shared by both.
//!
//! Invariants & assumptions
//! ------------------------
//! - Probabilities are carried in natural-log space; `-∞` is "impossible"
//!   and log-sum-exp over nothing is `-∞`, never NaN.
//! - Corpus readers, the grammar and parser themselves, and the E-step's
//!   expected counts are external collaborators, consumed through traits
//!   (`FeatureSource`, `ExpectedCountsProvider`, `BaseGrammar`,
//!   `ChartParser`, `SpanScorer`).
//!
//! Conventions
//! -----------
//! - Each module family has its own error enum and result alias
//!   (`OptError`, `GridError`, `EmError`, `ChartError`).
//! - Logging goes through the `log` facade; numerical kernels never log.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds the end-to-end EM
//!   and chart pipelines.
pub mod chart;
pub mod loglinear;
pub mod optimization;

pub mod prelude {
    pub use crate::chart::prelude::*;
    pub use crate::loglinear::prelude::*;
    pub use crate::optimization::prelude::*;
}
