//! Entry point for maximizing an [`Objective`] with L-BFGS.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Weights,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, Objective, OptimOptions},
    },
};

/// Maximize `f` starting from `w0`.
///
/// # Behavior
/// - Calls `f.check(w0, data)` once.
/// - Wraps `(f, data)` in an [`ArgMinAdapter`] so argmin minimizes `-f`.
/// - Builds L-BFGS with the line search chosen in `opts` and runs it.
///
/// # Errors
/// - Anything `f.check` reports.
/// - Solver construction or runtime failures.
///
/// # Example
/// ```
/// use loglinear_grammar::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{Objective, OptimOptions, Weights, maximize},
/// };
/// use ndarray::array;
///
/// struct Peak;
/// impl Objective for Peak {
///     type Data = ();
///     fn value(&self, w: &Weights, _: &()) -> OptResult<f64> {
///         Ok(-(w - 2.0).mapv(|x| x * x).sum())
///     }
///     fn check(&self, _: &Weights, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Peak, array![0.0, 0.0], &(), &OptimOptions::default())?;
/// assert!((out.weights[0] - 2.0).abs() < 1e-3);
/// # Ok::<(), loglinear_grammar::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: Objective>(
    f: &F, w0: Weights, data: &F::Data, opts: &OptimOptions,
) -> OptResult<OptimOutcome> {
    f.check(&w0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(w0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(w0, opts, problem, solver)
        }
    }
}
