//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Turn an [`OptimOptions`] into a configured argmin L-BFGS solver without the
//! rest of the crate touching argmin generics.
//!
//! Conventions
//! -----------
//! - Builders apply the history size and the optional gradient/cost
//!   tolerances only. The starting point and the iteration cap are runtime
//!   concerns handled by [`run_lbfgs`](super::run::run_lbfgs).
//! - Argmin configuration errors surface as [`OptError`](crate::optimization::errors::OptError).
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::OptimOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Weights,
        },
    },
};

/// L-BFGS with Hager–Zhang line search, configured from `opts`.
///
/// # Errors
/// Argmin rejecting a tolerance.
pub fn build_optimizer_hager_zhang(opts: &OptimOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search, configured from `opts`.
///
/// # Errors
/// Argmin rejecting a tolerance.
pub fn build_optimizer_more_thuente(opts: &OptimOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional tolerances in `opts` to an L-BFGS solver with any line
/// search. `None` leaves argmin's default in place.
///
/// # Errors
/// Argmin rejecting a tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Weights, Grad, Cost>, opts: &OptimOptions,
) -> OptResult<LBFGS<L, Weights, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
