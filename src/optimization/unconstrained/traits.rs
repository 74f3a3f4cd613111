//! Public API surface for unconstrained minimization.
//!
//! - [`Objective`]: trait users implement for the function being minimized.
//! - [`MinimizeOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by `minimize`.
use crate::optimization::{
    errors::{OptError, OptResult},
    unconstrained::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use serde::Deserialize;
use std::str::FromStr;

/// User-implemented objective interface.
///
/// - `type Data`: per-problem data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate the cost `c(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject obviously invalid
///   starting points. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait Objective {
    type Data;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`), both via
/// [`FromStr`] and when deserialized. Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
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

impl TryFrom<String> for LineSearcher {
    type Error = OptError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Optimizer-level configuration.
///
/// Default:
/// - `tols`: `tol_grad = 1e-8`, `tol_cost = 1e-8`, `max_iter = 250`
/// - `line_searcher`: `MoreThuente`
/// - `lbfgs_mem`: `None` (uses default of 7)
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizeOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-8), tol_cost: Some(1e-8), max_iter: Some(250) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best cost `c(θ̂)`.
/// - `converged`: `true` if the solver reported a terminating status other
///   than `NotTerminated`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and reject unknown names.
    fn line_searcher_from_str_is_case_insensitive() {
        assert_eq!("hagerzhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert_eq!("MORETHUENTE".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert!(matches!(
            "bfgs".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` enforces at least one stopping rule and positive values.
    fn tolerances_new_validates_inputs() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, Some(f64::NAN), None),
            Err(OptError::InvalidTolCost { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(Some(1e-8), Some(1e-8), Some(250)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // `MinimizeOptions::new` rejects a zero L-BFGS memory.
    fn minimize_options_rejects_zero_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();
        assert!(matches!(
            MinimizeOptions::new(tols, LineSearcher::HagerZhang, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `OptimOutcome::new` maps termination status and computes the gradient norm.
    fn optim_outcome_new_reports_status_and_grad_norm() {
        let outcome = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            0.5,
            TerminationStatus::NotTerminated,
            3,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 3);
        assert!((outcome.grad_norm.unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A missing parameter vector is reported rather than silently defaulted.
    fn optim_outcome_new_rejects_missing_theta() {
        let result = OptimOutcome::new(
            None,
            0.0,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            None,
        );
        assert_eq!(result.unwrap_err(), OptError::MissingThetaHat);
    }
}
