//! Public surface of the inner optimizer.
//!
//! - [`Objective`]: the function being *maximized* (for the EM M-step, the
//!   expected complete log-likelihood).
//! - [`OptimOptions`] / [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized solver result.
//!
//! Convention: argmin minimizes, so the adapter hands it `c(w) = -f(w)`.
//! Objectives always return `f(w)` and `∇f(w)`; they never negate themselves.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Weights,
        validation::{validate_optimum, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Function maximized by [`maximize`](super::maximize).
///
/// - `type Data`: payload passed to every evaluation (expected counts for
///   the EM objective).
/// - `value(w, data)`: objective value `f(w)`.
/// - `check(w, data)`: called once before the solver starts; reject
///   mismatched dimensions or inconsistent data here.
/// - `grad(w, data)`: analytic `∇f(w)`. The default reports
///   [`OptError::GradientNotImplemented`] and the adapter falls back to
///   finite differences.
pub trait Objective {
    type Data;

    fn value(&self, weights: &Weights, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, weights: &Weights, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _weights: &Weights, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver configuration for one optimizer run (one EM M-step).
///
/// Default: `tol_grad = 1e-6`, no cost tolerance, `max_iter = 100`,
/// More–Thuente line search, default L-BFGS memory, not verbose.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
    /// Attach argmin's slog observer (requires the `obs_slog` feature).
    pub verbose: bool,
}

impl OptimOptions {
    /// Build options; numeric tolerances are validated by [`Tolerances::new`].
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, lbfgs_mem, verbose: false })
    }

    /// Same options with the observer switched on or off.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Same options with a different inner iteration cap.
    ///
    /// # Errors
    /// [`OptError::InvalidMaxIter`] when `max_iter == 0`.
    pub fn with_max_iter(mut self, max_iter: usize) -> OptResult<Self> {
        self.tols = Tolerances::new(self.tols.tol_grad, self.tols.tol_cost, Some(max_iter))?;
        Ok(self)
    }
}

impl Default for OptimOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(100) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
            verbose: false,
        }
    }
}

/// Stopping rules for the solver. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of one solver run.
///
/// - `weights`: best point found.
/// - `value`: objective value `f(weights)` (not the cost).
/// - `converged`: argmin reported a termination reason.
/// - `status`: termination status as text.
/// - `iterations`, `fn_evals`: solver counters.
/// - `grad_norm`: norm of the last cost gradient, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub weights: Weights,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Normalize raw solver state into an outcome.
    ///
    /// # Errors
    /// Propagates [`validate_optimum`] and [`validate_value`] failures.
    pub fn new(
        best: Option<Weights>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let weights = validate_optimum(best)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        Ok(Self {
            weights,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}
