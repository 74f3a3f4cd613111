//! High-level entry point for minimizing a user-provided [`Objective`].
//!
//! Selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an `ArgMinAdapter`, and delegates the run
//! to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    unconstrained::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, MinimizeOptions, Objective},
    },
};

/// Minimize `c(θ)` using L-BFGS with the chosen line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(&theta0, data)`.
/// - Builds the solver selected by `opts.line_searcher`.
/// - Calls `run_lbfgs` and returns its [`OptimOutcome`].
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors from `build_optimizer_*`.
/// - Propagates runtime errors from `run_lbfgs` (e.g., line search failures).
///
/// # Example
/// ```
/// use ndarray::array;
/// use mixture_bounds::optimization::errors::OptResult;
/// use mixture_bounds::optimization::unconstrained::{minimize, MinimizeOptions, Objective, Theta};
///
/// struct Bowl;
/// impl Objective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok((theta - 1.0).mapv(|v| v * v).sum())
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.0, 3.0], &(), &MinimizeOptions::default())?;
/// assert!((out.theta_hat[0] - 1.0).abs() < 1e-4);
/// # Ok::<(), mixture_bounds::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MinimizeOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, unconstrained::traits::Tolerances};
    use ndarray::array;

    struct ShiftedBowl;

    impl Objective for ShiftedBowl {
        type Data = Theta;
        fn value(&self, theta: &Theta, center: &Theta) -> OptResult<f64> {
            let d = theta - center;
            Ok(d.dot(&d))
        }
        fn check(&self, theta: &Theta, center: &Theta) -> OptResult<()> {
            if theta.len() != center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches drive a convex bowl to its center.
    fn minimize_finds_center_of_bowl_with_both_line_searches() {
        let center = array![2.0, -1.0, 0.5];
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let tols = Tolerances::new(Some(1e-10), None, Some(200)).unwrap();
            let opts = MinimizeOptions::new(tols, ls, None).unwrap();

            let out = minimize(&ShiftedBowl, array![0.0, 0.0, 0.0], &center, &opts).unwrap();

            for (got, want) in out.theta_hat.iter().zip(center.iter()) {
                assert!((got - want).abs() < 1e-4, "{ls:?}: {got} vs {want}");
            }
            assert!(out.value < 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` runs before the solver and its error is returned unchanged.
    fn minimize_propagates_check_errors() {
        let center = array![1.0, 1.0];
        let err = minimize(&ShiftedBowl, array![0.0], &center, &MinimizeOptions::default())
            .unwrap_err();
        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 1 });
    }
}
