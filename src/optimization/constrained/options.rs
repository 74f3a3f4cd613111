//! Configuration for the augmented-Lagrangian solver.
use crate::optimization::{
    errors::{OptError, OptResult},
    unconstrained::MinimizeOptions,
};

/// Outer-loop settings plus the options of every inner L-BFGS solve.
///
/// - `inner`: options for each inner minimization (iterations, tolerances).
/// - `max_outer`: cap on multiplier updates.
/// - `penalty_init`: starting penalty `ρ₀ > 0`.
/// - `penalty_growth`: factor `> 1` applied when the violation stalls.
/// - `penalty_max`: ceiling for `ρ`.
/// - `violation_ratio`: the violation must shrink below this fraction of the
///   previous one, otherwise `ρ` grows. In `(0, 1)`.
/// - `feasibility_tol`: largest constraint violation treated as feasible.
/// - `step_tol`: largest coordinate change between outer iterations treated
///   as stationary.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedOptions {
    pub inner: MinimizeOptions,
    pub max_outer: usize,
    pub penalty_init: f64,
    pub penalty_growth: f64,
    pub penalty_max: f64,
    pub violation_ratio: f64,
    pub feasibility_tol: f64,
    pub step_tol: f64,
}

impl ConstrainedOptions {
    /// Build validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidMaxIter`] when `max_outer == 0`.
    /// - [`OptError::InvalidPenalty`] for any penalty, ratio, or tolerance
    ///   outside its admissible range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inner: MinimizeOptions, max_outer: usize, penalty_init: f64, penalty_growth: f64,
        penalty_max: f64, violation_ratio: f64, feasibility_tol: f64, step_tol: f64,
    ) -> OptResult<Self> {
        if max_outer == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter: max_outer,
                reason: "At least one outer iteration is required.",
            });
        }
        positive_finite("penalty_init", penalty_init)?;
        positive_finite("penalty_max", penalty_max)?;
        positive_finite("feasibility_tol", feasibility_tol)?;
        positive_finite("step_tol", step_tol)?;
        if !(penalty_growth.is_finite() && penalty_growth > 1.0) {
            return Err(OptError::InvalidPenalty {
                name: "penalty_growth",
                value: penalty_growth,
                reason: "Growth factor must be finite and greater than one.",
            });
        }
        if penalty_max < penalty_init {
            return Err(OptError::InvalidPenalty {
                name: "penalty_max",
                value: penalty_max,
                reason: "Penalty ceiling must not be below the initial penalty.",
            });
        }
        if !(violation_ratio > 0.0 && violation_ratio < 1.0) {
            return Err(OptError::InvalidPenalty {
                name: "violation_ratio",
                value: violation_ratio,
                reason: "Ratio must lie strictly between zero and one.",
            });
        }
        Ok(Self {
            inner,
            max_outer,
            penalty_init,
            penalty_growth,
            penalty_max,
            violation_ratio,
            feasibility_tol,
            step_tol,
        })
    }
}

impl Default for ConstrainedOptions {
    /// - `inner`: [`MinimizeOptions::default`] (250 iterations, 1e-8 tolerances)
    /// - `max_outer = 20`, `ρ₀ = 10`, growth `10`, ceiling `1e8`
    /// - `violation_ratio = 0.25`, `feasibility_tol = 1e-6`, `step_tol = 1e-8`
    fn default() -> Self {
        Self {
            inner: MinimizeOptions::default(),
            max_outer: 20,
            penalty_init: 10.0,
            penalty_growth: 10.0,
            penalty_max: 1e8,
            violation_ratio: 0.25,
            feasibility_tol: 1e-6,
            step_tol: 1e-8,
        }
    }
}

fn positive_finite(name: &'static str, value: f64) -> OptResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(OptError::InvalidPenalty {
            name,
            value,
            reason: "Value must be finite and strictly positive.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(growth: f64, ratio: f64, max_outer: usize) -> OptResult<ConstrainedOptions> {
        ConstrainedOptions::new(
            MinimizeOptions::default(),
            max_outer,
            10.0,
            growth,
            1e8,
            ratio,
            1e-6,
            1e-8,
        )
    }

    #[test]
    // Purpose
    // -------
    // The defaults pass the same validation as user-supplied options.
    fn defaults_are_valid() {
        let d = ConstrainedOptions::default();
        let rebuilt = ConstrainedOptions::new(
            d.inner.clone(),
            d.max_outer,
            d.penalty_init,
            d.penalty_growth,
            d.penalty_max,
            d.violation_ratio,
            d.feasibility_tol,
            d.step_tol,
        );
        assert_eq!(rebuilt.unwrap(), d);
    }

    #[test]
    // Purpose
    // -------
    // Each out-of-range setting is rejected with the matching variant.
    fn new_rejects_out_of_range_settings() {
        assert!(matches!(build(10.0, 0.25, 0), Err(OptError::InvalidMaxIter { .. })));
        assert!(matches!(
            build(1.0, 0.25, 5),
            Err(OptError::InvalidPenalty { name: "penalty_growth", .. })
        ));
        assert!(matches!(
            build(10.0, 1.0, 5),
            Err(OptError::InvalidPenalty { name: "violation_ratio", .. })
        ));
    }
}
