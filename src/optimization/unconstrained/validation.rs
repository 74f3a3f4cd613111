//! Validation helpers for the L-BFGS layer.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks costs for finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    unconstrained::{Grad, Theta},
};

/// Validate the optional gradient‐norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost‐change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar cost is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate that every entry of a parameter vector is finite.
///
/// # Errors
/// Returns [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta_input(theta: &Theta) -> OptResult<()> {
    match theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(OptError::InvalidThetaInput { index, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `validate_grad` reports dimension mismatches before scanning values.
    fn validate_grad_checks_dimension_then_values() {
        assert_eq!(
            validate_grad(&array![1.0, 2.0], 3),
            Err(OptError::GradientDimMismatch { expected: 3, found: 2 })
        );
        assert!(matches!(
            validate_grad(&array![1.0, f64::NAN], 2),
            Err(OptError::InvalidGradient { index: 1, .. })
        ));
        assert!(validate_grad(&array![0.0, -1.0], 2).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // `validate_theta_input` points at the first non-finite entry.
    fn validate_theta_input_reports_first_bad_index() {
        let theta = array![0.0, f64::INFINITY, f64::NAN];
        assert!(matches!(
            validate_theta_input(&theta),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert!(validate_theta_input(&array![1.0, 2.0]).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Non-finite costs are rejected; negative finite costs are fine.
    fn validate_value_accepts_negative_finite_costs() {
        assert!(validate_value(-3.5).is_ok());
        assert!(validate_value(f64::NEG_INFINITY).is_err());
    }
}
