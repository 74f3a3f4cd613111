//! Constrained problem interface and violation measures.
use crate::optimization::{
    errors::{OptError, OptResult},
    unconstrained::Theta,
};
use ndarray::Array1;

/// A smooth minimization problem with equality and inequality constraints.
///
/// Minimize `f(x)` subject to `h(x) = 0` and `g(x) ≥ 0`, elementwise.
///
/// - `value`: objective `f(x)`.
/// - `equalities`: `h(x)`; its length must not depend on `x`.
/// - `inequalities`: `g(x)`; its length must not depend on `x`.
/// - `check`: rejects a starting point before any work is done.
pub trait ConstrainedProblem {
    type Data;

    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<f64>;
    fn equalities(&self, x: &Theta, data: &Self::Data) -> OptResult<Array1<f64>>;
    fn inequalities(&self, x: &Theta, data: &Self::Data) -> OptResult<Array1<f64>>;
    fn check(&self, x: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Largest constraint violation: `max(max|hᵢ|, max(−gⱼ, 0))`.
///
/// Empty constraint vectors contribute zero.
pub fn max_violation(h: &Array1<f64>, g: &Array1<f64>) -> f64 {
    let eq = h.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    g.iter().fold(eq, |acc, v| acc.max(-v))
}

/// Verify a constraint vector has the expected length and finite entries.
///
/// # Errors
/// - [`OptError::ConstraintDimMismatch`] on a length change.
/// - [`OptError::NonFiniteConstraint`] for the first NaN/±∞ entry.
pub fn validate_constraints(
    values: &Array1<f64>, expected: usize, kind: &'static str,
) -> OptResult<()> {
    if values.len() != expected {
        return Err(OptError::ConstraintDimMismatch { kind, expected, found: values.len() });
    }
    match values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(OptError::NonFiniteConstraint { kind, index, value }),
        None => Ok(()),
    }
}
