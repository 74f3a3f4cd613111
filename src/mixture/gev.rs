//! Generalized extreme value (GEV) distribution primitives.
//!
//! Parameterization: location `μ`, scale `σ > 0`, shape `ξ`, with
//!
//! ```text
//! z = (x − μ)/σ,   t(x) = (1 + ξz)^(−1/ξ)   (ξ ≠ 0)
//!                  t(x) = exp(−z)            (ξ = 0, Gumbel)
//! F(x) = exp(−t(x)),   f(x) = t(x)^(ξ+1) exp(−t(x)) / σ
//! ```
//!
//! Support is `{x : 1 + ξz > 0}`. Below the lower endpoint (ξ > 0) the CDF is
//! 0, above the upper endpoint (ξ < 0) it is 1, and the density vanishes on
//! both sides. Everything is computed through `ln(1 + ξz)` so that shapes of
//! order 10³ do not overflow intermediate powers.

/// Shapes with `|ξ|` below this are evaluated with the Gumbel limit.
pub const GUMBEL_TOL: f64 = 1e-8;

/// Scales at or below this are floored to it before evaluation.
pub const MIN_SCALE: f64 = 1e-12;

/// Position of `x` relative to the support of a component.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Reduced {
    /// Inside the support; carries `ln t(x)`.
    Inside(f64),
    /// Below the lower endpoint (ξ > 0).
    Below,
    /// Above the upper endpoint (ξ < 0).
    Above,
}

fn floor_scale(scale: f64) -> f64 {
    if scale > MIN_SCALE { scale } else { MIN_SCALE }
}

fn reduced(x: f64, location: f64, scale: f64, shape: f64) -> Reduced {
    let z = (x - location) / floor_scale(scale);
    if shape.abs() < GUMBEL_TOL {
        return Reduced::Inside(-z);
    }
    let s = 1.0 + shape * z;
    if s > 0.0 {
        Reduced::Inside(-s.ln() / shape)
    } else if shape > 0.0 {
        Reduced::Below
    } else {
        Reduced::Above
    }
}

/// Cumulative distribution function `F(x)`.
pub fn cdf(x: f64, location: f64, scale: f64, shape: f64) -> f64 {
    match reduced(x, location, scale, shape) {
        Reduced::Inside(ln_t) => (-ln_t.exp()).exp(),
        Reduced::Below => 0.0,
        Reduced::Above => 1.0,
    }
}

/// Log density `ln f(x)`; `−∞` outside the support.
pub fn ln_pdf(x: f64, location: f64, scale: f64, shape: f64) -> f64 {
    match reduced(x, location, scale, shape) {
        Reduced::Inside(ln_t) => {
            let xi = if shape.abs() < GUMBEL_TOL { 0.0 } else { shape };
            (xi + 1.0) * ln_t - ln_t.exp() - floor_scale(scale).ln()
        }
        Reduced::Below | Reduced::Above => f64::NEG_INFINITY,
    }
}

/// Density `f(x)`; 0 outside the support.
pub fn pdf(x: f64, location: f64, scale: f64, shape: f64) -> f64 {
    ln_pdf(x, location, scale, shape).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Closed-form values of the Gumbel and Fréchet-type branches.
    // - Behavior outside the support for both signs of the shape.
    // - Finiteness for extreme shapes and non-positive scales.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The Gumbel branch matches exp(−exp(−z)) and its density.
    fn gumbel_branch_matches_closed_form() {
        // Given μ = 1, σ = 2, ξ = 0 and x = 3 → z = 1
        let z: f64 = 1.0;
        let expected_cdf = (-(-z).exp()).exp();
        let expected_pdf = (-z - (-z).exp()).exp() / 2.0;

        assert!((cdf(3.0, 1.0, 2.0, 0.0) - expected_cdf).abs() < 1e-14);
        assert!((pdf(3.0, 1.0, 2.0, 0.0) - expected_pdf).abs() < 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // A positive shape gives t = (1 + ξz)^(−1/ξ) inside the support.
    fn positive_shape_matches_closed_form() {
        // Given ξ = 0.5, z = 2 → t = 2^(−2) = 0.25
        let t: f64 = 0.25;
        assert!((cdf(2.0, 0.0, 1.0, 0.5) - (-t).exp()).abs() < 1e-14);
        assert!((pdf(2.0, 0.0, 1.0, 0.5) - t.powf(1.5) * (-t).exp()).abs() < 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Outside the support the CDF saturates and the density vanishes.
    fn outside_support_saturates() {
        // Lower endpoint at μ − σ/ξ = −2 for ξ = 0.5
        assert_eq!(cdf(-3.0, 0.0, 1.0, 0.5), 0.0);
        assert_eq!(pdf(-3.0, 0.0, 1.0, 0.5), 0.0);
        // Upper endpoint at μ + σ/|ξ| = 2 for ξ = −0.5
        assert_eq!(cdf(3.0, 0.0, 1.0, -0.5), 1.0);
        assert_eq!(ln_pdf(3.0, 0.0, 1.0, -0.5), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Extreme shapes and zero scales still evaluate to finite CDF values.
    fn extreme_parameters_stay_finite() {
        for &shape in &[-999.0, -1e-9, 1e-9, 999.0] {
            for &x in &[-100.0, 0.0, 0.5, 100.0] {
                let c = cdf(x, 0.0, 500.0, shape);
                assert!((0.0..=1.0).contains(&c), "cdf({x}; ξ={shape}) = {c}");
            }
        }
        assert!(cdf(1.0, 0.0, 0.0, 0.1).is_finite());
        assert!(cdf(1.0, 0.0, -5.0, 0.1).is_finite());
    }
}
