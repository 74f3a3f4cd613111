//! Execution helper that runs an `argmin` solver on an [`Objective`] and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    unconstrained::{
        Grad, MinimizeOptions, Objective, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{Executor, State};

/// Run an `argmin` L-BFGS optimization.
///
/// Shared runner for both line-search variants. Moves `theta0` into the
/// executor state, applies `opts.tols.max_iter`, runs, and converts the final
/// state into an [`OptimOutcome`] holding the best parameter, best cost,
/// termination status, iteration count, evaluation counters and the last
/// gradient norm.
///
/// # Errors
/// - Propagates any `argmin` runtime error (line-search failures, errors
///   raised by the cost closure) via `From<argmin::core::Error>`.
/// - Propagates validation errors raised while building the outcome.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MinimizeOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: argmin::core::Solver<
        ArgMinAdapter<'a, F>,
        argmin::core::IterState<Theta, Grad, (), (), (), f64>,
    >,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
