//! Adapter that exposes a user [`Objective`] as an `argmin` problem.
//!
//! The cost is passed through unchanged. Analytic gradients are validated
//! and used when available; otherwise the cost is finite-differenced,
//! central first and forward as a fallback.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    unconstrained::{
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ)`.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the user’s `value` via `?`.
    /// - `NonFiniteCost` if the value is NaN or infinite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the user implements `grad(θ, data)`, it is validated and returned.
    /// - Otherwise a finite-difference gradient of the cost is computed:
    ///   central differences first; if any cost evaluation failed or the
    ///   result is not finite, one retry with forward differences.
    ///
    /// The FD closure must return `f64`, so errors raised inside it are
    /// captured in `closure_err` and the closure returns `NaN`.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                if closure_err.borrow().is_some() || validate_grad(&fd_grad, dim).is_err() {
                    return run_forward_diff(theta, &cost_func, &closure_err);
                }
                Ok(fd_grad)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user objective and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, returns any captured error,
/// and otherwise validates the gradient.
fn run_forward_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}
