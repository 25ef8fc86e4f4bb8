//! EM driver — lazy sequence of training states.
//!
//! Purpose
//! -------
//! Alternate an external E-step (expected counts under the current
//! log-thetas) with an L-BFGS M-step on the expected complete
//! log-likelihood, producing one immutable [`State`] per cycle.
//!
//! Key behaviors
//! -------------
//! - [`EmDriver`] is an `Iterator<Item = EmResult<State>>`. Each `next()`
//!   runs exactly one E/M cycle from the current weights:
//!   1. `provider.expected_counts(log_thetas(w)) -> (L, e)`,
//!   2. `w' = argmax_w ECLL(w; e)`, seeded at `w`,
//!   3. yield `State(w', L)`.
//! - The seed weights are never yielded. The first item is the first real
//!   cycle, and its likelihood is the marginal likelihood of the seed.
//! - The iterator is unbounded and has no convergence test. After an error
//!   it is fused and yields `None`.
//! - [`EmDriver::run_until`] and [`EmDriver::run_to_convergence`] are opt-in
//!   stopping helpers bounded by [`EmOptions::max_iterations`].
//!
//! Invariants & assumptions
//! ------------------------
//! - All states of one driver share the same feature grid.
//! - Iterations are strictly sequential; the driver holds `&mut` access to
//!   its provider for the whole run.
//!
//! Logging
//! -------
//! `debug!` per M-step (optimizer status, inner iterations, gradient norm)
//! and `info!` per cycle (iteration, likelihood, weight delta). Stopping
//! helpers report why they stopped.
use crate::{
    loglinear::{
        core::{
            counts::ExpectedCounts,
            grid::FeatureGrid,
            theta::{LogThetas, compute_log_thetas},
        },
        errors::{EmError, EmResult, GridResult},
        models::objective::ExpectedCompleteLikelihood,
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Objective, OptimOptions, OptimOutcome, Weights, maximize},
    },
};
use log::{debug, info, warn};
use std::{
    iter::FusedIterator,
    sync::{Arc, OnceLock},
};

/// Immutable snapshot `{weights, marginal log-likelihood}` of one EM cycle.
///
/// `log_likelihood` is the incomplete-data log-likelihood reported by the
/// E-step that produced these weights, i.e. the likelihood of the *previous*
/// weights. Log-thetas under `weights` are computed on first request and
/// cached.
#[derive(Debug, Clone)]
pub struct State {
    weights: Weights,
    log_likelihood: f64,
    grid: Arc<FeatureGrid>,
    thetas: OnceLock<LogThetas>,
}

impl State {
    fn new(grid: Arc<FeatureGrid>, weights: Weights, log_likelihood: f64) -> Self {
        Self { weights, log_likelihood, grid, thetas: OnceLock::new() }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn grid(&self) -> &FeatureGrid {
        &self.grid
    }

    /// Log-thetas under this state's weights.
    ///
    /// # Errors
    /// Only if the weights do not fit the grid, which the driver rules out.
    pub fn log_thetas(&self) -> GridResult<&LogThetas> {
        if let Some(thetas) = self.thetas.get() {
            return Ok(thetas);
        }
        let thetas = compute_log_thetas(&self.grid, &self.weights)?;
        Ok(self.thetas.get_or_init(|| thetas))
    }
}

/// External E-step: expected counts and marginal log-likelihood under the
/// given log-thetas.
///
/// Closures `FnMut(&LogThetas) -> EmResult<(f64, ExpectedCounts)>` implement
/// this trait.
pub trait ExpectedCountsProvider {
    fn expected_counts(&mut self, thetas: &LogThetas) -> EmResult<(f64, ExpectedCounts)>;
}

impl<F> ExpectedCountsProvider for F
where
    F: FnMut(&LogThetas) -> EmResult<(f64, ExpectedCounts)>,
{
    fn expected_counts(&mut self, thetas: &LogThetas) -> EmResult<(f64, ExpectedCounts)> {
        self(thetas)
    }
}

/// M-step solver: minimizes `-f` starting from `start`.
pub trait Minimizer {
    fn minimize<F: Objective>(
        &self, objective: &F, data: &F::Data, start: Weights,
    ) -> OptResult<OptimOutcome>;
}

/// argmin L-BFGS with the configured line search and tolerances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LbfgsMinimizer {
    pub options: OptimOptions,
}

impl LbfgsMinimizer {
    pub fn new(options: OptimOptions) -> Self {
        Self { options }
    }
}

impl Minimizer for LbfgsMinimizer {
    fn minimize<F: Objective>(
        &self, objective: &F, data: &F::Data, start: Weights,
    ) -> OptResult<OptimOutcome> {
        maximize(objective, start, data, &self.options)
    }
}

/// Driver configuration.
///
/// - `optim`: inner optimizer options; `optim.tols.max_iter` bounds each
///   M-step.
/// - `max_iterations`: cap on states pulled by the `run_*` helpers.
/// - `tolerance`: threshold on [`weight_delta_norm`] for
///   [`EmDriver::run_to_convergence`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmOptions {
    pub optim: OptimOptions,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl EmOptions {
    /// # Errors
    /// - [`EmError::InvalidMaxIterations`] when `max_iterations == 0`.
    /// - [`EmError::InvalidTolerance`] unless `tolerance` is finite and > 0.
    pub fn new(optim: OptimOptions, max_iterations: usize, tolerance: f64) -> EmResult<Self> {
        if max_iterations == 0 {
            return Err(EmError::InvalidMaxIterations { max_iterations });
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(EmError::InvalidTolerance { tol: tolerance });
        }
        Ok(Self { optim, max_iterations, tolerance })
    }
}

impl Default for EmOptions {
    fn default() -> Self {
        Self { optim: OptimOptions::default(), max_iterations: 50, tolerance: 1e-6 }
    }
}

/// `‖a − b‖₂ / dim`; `0` for empty vectors, `∞` for mismatched lengths.
pub fn weight_delta_norm(a: &Weights, b: &Weights) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    if a.is_empty() {
        return 0.0;
    }
    let squared: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    squared.sqrt() / a.len() as f64
}

/// Pull-based EM iteration over a fixed feature grid.
pub struct EmDriver<P, M = LbfgsMinimizer> {
    grid: Arc<FeatureGrid>,
    provider: P,
    minimizer: M,
    options: EmOptions,
    weights: Weights,
    iteration: usize,
    halted: bool,
}

impl<P: ExpectedCountsProvider> EmDriver<P, LbfgsMinimizer> {
    /// Driver using [`LbfgsMinimizer`] with `options.optim`.
    ///
    /// # Errors
    /// [`EmError::InitialWeightsMismatch`] when `seed` does not have one entry
    /// per feature; [`EmError::Optimizer`] for non-finite seed weights.
    pub fn new(
        grid: Arc<FeatureGrid>, provider: P, seed: Weights, options: EmOptions,
    ) -> EmResult<Self> {
        let minimizer = LbfgsMinimizer::new(options.optim.clone());
        Self::with_minimizer(grid, provider, minimizer, seed, options)
    }
}

impl<P: ExpectedCountsProvider, M: Minimizer> EmDriver<P, M> {
    /// Driver with a caller-supplied M-step solver.
    ///
    /// # Errors
    /// Same as [`EmDriver::new`].
    pub fn with_minimizer(
        grid: Arc<FeatureGrid>, provider: P, minimizer: M, seed: Weights, options: EmOptions,
    ) -> EmResult<Self> {
        if seed.len() != grid.num_features() {
            return Err(EmError::InitialWeightsMismatch {
                expected: grid.num_features(),
                found: seed.len(),
            });
        }
        if let Some(index) = seed.iter().position(|w| !w.is_finite()) {
            return Err(OptError::InvalidWeight { index, value: seed[index] }.into());
        }
        Ok(Self { grid, provider, minimizer, options, weights: seed, iteration: 0, halted: false })
    }

    /// Number of completed E/M cycles.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Weights the next cycle starts from.
    pub fn current_weights(&self) -> &Weights {
        &self.weights
    }

    pub fn options(&self) -> &EmOptions {
        &self.options
    }

    fn step(&mut self) -> EmResult<State> {
        let thetas = compute_log_thetas(&self.grid, &self.weights)?;
        let (log_likelihood, counts) = self.provider.expected_counts(&thetas)?;
        let objective = ExpectedCompleteLikelihood::new(&self.grid);
        let outcome = self.minimizer.minimize(&objective, &counts, self.weights.clone())?;
        debug!(
            "EM iteration {}: M-step {} after {} inner iterations (grad norm {:?}, ECLL {:.6})",
            self.iteration + 1,
            outcome.status,
            outcome.iterations,
            outcome.grad_norm,
            outcome.value
        );
        let delta = weight_delta_norm(&self.weights, &outcome.weights);
        self.iteration += 1;
        self.weights = outcome.weights;
        info!(
            "EM iteration {}: log-likelihood {:.6}, weight delta {:.3e}",
            self.iteration, log_likelihood, delta
        );
        Ok(State::new(Arc::clone(&self.grid), self.weights.clone(), log_likelihood))
    }

    /// Pull states until `stop(prev, next)` holds or `max_iterations` states
    /// have been pulled by this call; return the last state pulled.
    ///
    /// # Errors
    /// The first failing cycle, or [`EmError::Halted`] if the driver had
    /// already failed.
    pub fn run_until<S>(&mut self, mut stop: S) -> EmResult<State>
    where
        S: FnMut(&State, &State) -> bool,
    {
        let mut prev = self.next().ok_or(EmError::Halted)??;
        for _ in 1..self.options.max_iterations {
            let next = self.next().ok_or(EmError::Halted)??;
            if stop(&prev, &next) {
                info!("EM stopped by predicate after {} iterations", self.iteration);
                return Ok(next);
            }
            prev = next;
        }
        info!("EM reached max_iterations = {}", self.options.max_iterations);
        Ok(prev)
    }

    /// [`run_until`](Self::run_until) with
    /// `weight_delta_norm(prev, next) < options.tolerance`.
    ///
    /// # Errors
    /// Same as [`run_until`](Self::run_until).
    pub fn run_to_convergence(&mut self) -> EmResult<State> {
        let tol = self.options.tolerance;
        self.run_until(|prev, next| weight_delta_norm(prev.weights(), next.weights()) < tol)
    }
}

impl<P: ExpectedCountsProvider, M: Minimizer> Iterator for EmDriver<P, M> {
    type Item = EmResult<State>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let result = self.step();
        if let Err(err) = &result {
            warn!("EM iteration {} failed: {err}", self.iteration + 1);
            self.halted = true;
        }
        Some(result)
    }
}

impl<P: ExpectedCountsProvider, M: Minimizer> FusedIterator for EmDriver<P, M> {}
