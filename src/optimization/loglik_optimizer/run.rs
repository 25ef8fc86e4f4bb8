//! Executes an argmin solver on an [`Objective`] and normalizes the result.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Objective, OptimOptions, OptimOutcome, Weights, adapter::ArgMinAdapter,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run `solver` from `w0` on `problem`.
///
/// Sets the starting point and, when configured, `opts.tols.max_iter` as the
/// executor's iteration cap. With the `obs_slog` feature and
/// `opts.verbose`, a terminal observer is attached and the starting value is
/// logged once.
///
/// # Returns
/// An [`OptimOutcome`] whose `value` is the objective at the best point
/// (the negated best cost).
///
/// # Errors
/// - Argmin runtime errors (line search failures, objective errors).
/// - Outcome validation errors.
pub fn run_lbfgs<'a, F, S>(
    w0: Weights, opts: &OptimOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Weights, Grad, (), (), (), f64>> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&w0, &problem)?;
    }
    let mut executor = Executor::new(problem, solver).configure(|state| state.param(w0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<F: Objective>(w0: &Weights, problem: &ArgMinAdapter<'_, F>) -> OptResult<()> {
    let f0 = -problem.cost(w0)?;
    let g0 = problem.gradient(w0).ok().map(|g| g.l2_norm());
    log::info!(
        "L-BFGS start: f(w0) = {:.6}{}",
        f0,
        g0.map(|n| format!(", ||grad|| = {n:.6}")).unwrap_or_default()
    );
    Ok(())
}
