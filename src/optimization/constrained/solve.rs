//! Outer loop of the augmented-Lagrangian method.
use crate::optimization::{
    constrained::{
        lagrangian::AugmentedLagrangian,
        options::ConstrainedOptions,
        problem::{ConstrainedProblem, max_violation, validate_constraints},
    },
    errors::OptResult,
    unconstrained::{Theta, minimize, validation::validate_theta_input},
};
use ndarray::Array1;

/// Result of a constrained solve.
///
/// - `x`: final iterate.
/// - `value`: objective `f(x)` (without penalty terms).
/// - `max_violation`: largest constraint violation at `x`.
/// - `feasible`: `max_violation <= feasibility_tol`.
/// - `converged`: feasible and the last outer step was below `step_tol`.
/// - `outer_iterations` / `inner_iterations`: work performed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedOutcome {
    pub x: Theta,
    pub value: f64,
    pub max_violation: f64,
    pub feasible: bool,
    pub converged: bool,
    pub outer_iterations: usize,
    pub inner_iterations: usize,
}

/// Minimize `f(x)` subject to `h(x) = 0`, `g(x) ≥ 0` from the start `x0`.
///
/// Each outer iteration minimizes the augmented Lagrangian with L-BFGS
/// (warm-started at the previous iterate), then updates the multipliers.
/// The penalty grows by `penalty_growth` (capped at `penalty_max`) whenever
/// the violation fails to shrink below `violation_ratio` times its previous
/// value. The loop stops once the iterate is feasible and stationary, or
/// after `max_outer` iterations.
///
/// # Errors
/// - Propagates `problem.check` failures.
/// - Propagates any inner-solver error (non-finite costs, line-search
///   breakdowns) and constraint validation errors.
pub fn solve_constrained<P: ConstrainedProblem>(
    problem: &P, x0: Theta, data: &P::Data, opts: &ConstrainedOptions,
) -> OptResult<ConstrainedOutcome> {
    validate_theta_input(&x0)?;
    problem.check(&x0, data)?;
    let h0 = problem.equalities(&x0, data)?;
    let g0 = problem.inequalities(&x0, data)?;
    let (n_eq, n_ineq) = (h0.len(), g0.len());
    validate_constraints(&h0, n_eq, "equality")?;
    validate_constraints(&g0, n_ineq, "inequality")?;

    let mut lambda = Array1::zeros(n_eq);
    let mut mu = Array1::zeros(n_ineq);
    let mut rho = opts.penalty_init;
    let mut x = x0;
    let mut violation = max_violation(&h0, &g0);
    let mut converged = false;
    let mut outer_iterations = 0;
    let mut inner_iterations = 0;

    while outer_iterations < opts.max_outer {
        outer_iterations += 1;
        let lagrangian = AugmentedLagrangian::new(problem, lambda, mu, rho);
        let inner = minimize(&lagrangian, x.clone(), data, &opts.inner)?;
        inner_iterations += inner.iterations;

        let step = (&inner.theta_hat - &x).fold(0.0_f64, |acc, v| acc.max(v.abs()));
        x = inner.theta_hat;

        let h = problem.equalities(&x, data)?;
        let g = problem.inequalities(&x, data)?;
        validate_constraints(&h, n_eq, "equality")?;
        validate_constraints(&g, n_ineq, "inequality")?;
        let new_violation = max_violation(&h, &g);

        (lambda, mu) = lagrangian.updated_multipliers(&h, &g);

        if new_violation <= opts.feasibility_tol && step <= opts.step_tol {
            violation = new_violation;
            converged = true;
            break;
        }
        if new_violation > opts.violation_ratio * violation {
            rho = (rho * opts.penalty_growth).min(opts.penalty_max);
        }
        violation = new_violation;
    }

    let value = problem.value(&x, data)?;
    Ok(ConstrainedOutcome {
        x,
        value,
        max_violation: violation,
        feasible: violation <= opts.feasibility_tol,
        converged,
        outer_iterations,
        inner_iterations,
    })
}
