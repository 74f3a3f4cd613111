//! unconstrained::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small builders for L-BFGS solvers that hide Argmin’s generic
//! wiring and apply crate-level options (tolerances, memory size).
//!
//! Conventions
//! -----------
//! - The builders do **not** set an initial parameter vector or
//!   `max_iters`; these are runtime concerns applied by `run_lbfgs`.
//! - Errors are reported via [`OptResult`]; `argmin::core::Error` values
//!   never leak across module boundaries.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    unconstrained::{
        traits::MinimizeOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// Construct L-BFGS with Hager–Zhang line search.
///
/// Uses `opts.lbfgs_mem` (or [`DEFAULT_LBFGS_MEM`]) and applies any
/// configured tolerances via [`configure_lbfgs`].
///
/// # Errors
/// Returns an `OptError` when Argmin rejects one of the tolerances.
pub fn build_optimizer_hager_zhang(opts: &MinimizeOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with More–Thuente line search.
///
/// # Errors
/// Returns an `OptError` when Argmin rejects one of the tolerances.
pub fn build_optimizer_more_thuente(opts: &MinimizeOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional gradient and cost-change tolerances to an L-BFGS solver,
/// regardless of its line-search type.
///
/// When a tolerance is `None`, Argmin’s default stays in effect.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MinimizeOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
