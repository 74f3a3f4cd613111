//! Candidates and the append-only candidate pool.
//!
//! A [`Candidate`] is a mixture `(theta, weights)` whose weights lie on the
//! simplex and whose mixture CDF matches every target probability at the
//! quantile locations. Candidates are never mutated after generation; the
//! ranker and refiner only read them.
use crate::{
    bounds::{
        data::BoundsContext,
        errors::{BoundsError, BoundsResult},
    },
    mixture::{MixtureEvaluator, params},
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One admissible mixture parameterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    theta: Array2<f64>,
    weights: Array1<f64>,
}

impl Candidate {
    /// Wrap `theta` (`m × 3`) and `weights` (length `m`).
    ///
    /// # Errors
    /// - [`BoundsError::CandidateShape`] when the shapes disagree.
    pub fn new(theta: Array2<f64>, weights: Array1<f64>) -> BoundsResult<Self> {
        let candidate = Self { theta, weights };
        candidate.check_shape(candidate.weights.len())?;
        Ok(candidate)
    }

    /// Rebuild a candidate from a flat optimizer vector.
    ///
    /// # Errors
    /// - [`BoundsError::Optimizer`] wrapping
    ///   [`OptError::ThetaLengthMismatch`](crate::optimization::errors::OptError::ThetaLengthMismatch)
    ///   when `x` has the wrong length.
    pub fn from_flat(x: &Array1<f64>, n_components: usize) -> BoundsResult<Self> {
        let (theta, weights) = params::split(x, n_components)?;
        Ok(Self { theta, weights })
    }

    /// Snap a flat optimizer vector onto the admissible set.
    ///
    /// Scales and weights are clamped at zero and the weights rescaled to
    /// sum to one. Returns `Ok(None)` when no weight is positive. The
    /// quantile constraints are not re-solved; check
    /// [`Candidate::max_residual`] on the result.
    ///
    /// # Errors
    /// - As [`Candidate::from_flat`].
    pub fn projected(x: &Array1<f64>, n_components: usize) -> BoundsResult<Option<Self>> {
        let Self { mut theta, mut weights } = Self::from_flat(x, n_components)?;
        theta.column_mut(params::SCALE).mapv_inplace(|s| s.max(0.0));
        weights.mapv_inplace(|p| p.max(0.0));
        let total = weights.sum();
        if !(total.is_finite() && total > 0.0) {
            return Ok(None);
        }
        weights /= total;
        Ok(Some(Self { theta, weights }))
    }

    pub fn theta(&self) -> &Array2<f64> {
        &self.theta
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    /// Flat optimizer vector `[theta row-major..., weights...]`.
    pub fn flatten(&self) -> Array1<f64> {
        params::flatten(&self.theta, &self.weights)
    }

    /// Verify the candidate has `expected` components.
    ///
    /// # Errors
    /// - [`BoundsError::CandidateShape`] on any mismatch.
    pub fn check_shape(&self, expected: usize) -> BoundsResult<()> {
        let (rows, cols) = self.theta.dim();
        if rows != expected || cols != params::PARAMS_PER_COMPONENT || self.weights.len() != expected
        {
            return Err(BoundsError::CandidateShape {
                expected_components: expected,
                rows,
                cols,
                weights: self.weights.len(),
            });
        }
        Ok(())
    }

    /// Largest violation of the simplex and quantile-matching constraints.
    ///
    /// Combines `|Σp − 1|`, `max(−pᵢ, 0)` and `|F(qᵢ) − αᵢ|`.
    pub fn max_residual<E: MixtureEvaluator>(&self, ctx: &BoundsContext<E>) -> f64 {
        let sum = (self.weights.sum() - 1.0).abs();
        let negative = self.weights.iter().fold(0.0_f64, |acc, &p| acc.max(-p));
        let cdf = ctx.evaluator.cdf_matrix(ctx.constraints.quantiles(), &self.theta);
        let matched = (cdf.dot(&self.weights) - ctx.constraints.alphas())
            .iter()
            .fold(0.0_f64, |acc, r| acc.max(r.abs()));
        sum.max(negative).max(matched)
    }

    /// Whether every constraint holds within `tol`.
    pub fn satisfies<E: MixtureEvaluator>(&self, ctx: &BoundsContext<E>, tol: f64) -> bool {
        self.check_shape(ctx.n_components()).is_ok() && self.max_residual(ctx) <= tol
    }

    /// Target functional of this candidate at `x`.
    pub fn functional<E: MixtureEvaluator>(&self, ctx: &BoundsContext<E>, x: f64) -> f64 {
        ctx.evaluator.functional(x, &self.theta, &self.weights, ctx.data())
    }
}

/// Append-only collection of candidates.
///
/// Indices are stable: a candidate keeps its position for the lifetime of
/// the pool, which the ranker uses to break ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Append new candidates after the existing ones.
    pub fn extend<I: IntoIterator<Item = Candidate>>(&mut self, new: I) {
        self.candidates.extend(new);
    }

    /// Verify every candidate has `expected` components.
    ///
    /// # Errors
    /// - The first [`BoundsError::CandidateShape`] found.
    pub fn check_shapes(&self, expected: usize) -> BoundsResult<()> {
        self.candidates.iter().try_for_each(|c| c.check_shape(expected))
    }
}

impl From<Vec<Candidate>> for CandidatePool {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounds::data::{Observations, QuantileConstraints},
        mixture::GevMixture,
        optimization::errors::OptError,
    };
    use ndarray::array;

    fn context() -> BoundsContext<GevMixture> {
        let constraints = QuantileConstraints::new(array![0.0], array![0.5]).unwrap();
        let observations = Observations::new(array![-1.0, 0.0, 1.0]).unwrap();
        BoundsContext::new(constraints, observations, GevMixture)
    }

    #[test]
    // Purpose
    // -------
    // A hand-built two-component mixture matching F(0) = 0.5 is accepted.
    //
    // Given
    // -----
    // Component 0 is Gumbel at 0 (F(0) = e⁻¹); component 1 has F(0) = 1
    // (upper endpoint below 0). Weights solve p₀e⁻¹ + p₁ = 0.5, p₀ + p₁ = 1.
    fn satisfies_accepts_consistent_candidate() {
        let e = (-1.0_f64).exp();
        let p0 = 0.5 / (1.0 - e);
        let theta = array![[0.0, 1.0, 0.0], [-5.0, 1.0, -1.0]];
        let candidate = Candidate::new(theta, array![p0, 1.0 - p0]).unwrap();

        let ctx = context();
        assert!(candidate.max_residual(&ctx) < 1e-12);
        assert!(candidate.satisfies(&ctx, 1e-9));
    }

    #[test]
    // Purpose
    // -------
    // Negative weights count as a violation even when sums match.
    fn satisfies_rejects_negative_weight() {
        let theta = array![[0.0, 1.0, 0.0], [-5.0, 1.0, -1.0]];
        let candidate = Candidate::new(theta, array![1.5, -0.5]).unwrap();
        assert!(!candidate.satisfies(&context(), 1e-9));
    }

    #[test]
    // Purpose
    // -------
    // Flat vectors round-trip through `from_flat` and bad lengths are caught.
    fn from_flat_rebuilds_candidate() {
        let theta = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let c = Candidate::new(theta, array![0.4, 0.6]).unwrap();
        assert_eq!(Candidate::from_flat(&c.flatten(), 2).unwrap(), c);
        assert!(matches!(
            Candidate::from_flat(&array![1.0, 2.0], 2),
            Err(BoundsError::Optimizer(OptError::ThetaLengthMismatch { expected: 8, actual: 2 }))
        ));
    }

    #[test]
    // Purpose
    // -------
    // Projection clamps small negative weights and scales, then renormalizes
    // the weights onto the simplex.
    fn projected_lands_on_simplex() {
        let x = array![0.0, 1.0, 0.0, -5.0, -1e-9, -1.0, 1.0 + 2e-7, -1e-7];
        let c = Candidate::projected(&x, 2).unwrap().unwrap();

        assert_eq!(c.weights()[1], 0.0);
        assert!((c.weights().sum() - 1.0).abs() < 1e-15);
        assert_eq!(c.theta()[[1, params::SCALE]], 0.0);
        assert_eq!(c.theta()[[0, params::LOCATION]], 0.0);

        let none = array![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, -0.5, 0.0];
        assert_eq!(Candidate::projected(&none, 2).unwrap(), None);
    }

    #[test]
    // Purpose
    // -------
    // Pools only grow through `extend` and keep insertion order.
    fn pool_appends_in_order() {
        let a = Candidate::new(array![[0.0, 1.0, 0.0]], array![1.0]).unwrap();
        let b = Candidate::new(array![[1.0, 1.0, 0.0]], array![1.0]).unwrap();

        let mut pool = CandidatePool::from(vec![a.clone()]);
        pool.extend(vec![b.clone()]);
        pool.extend(vec![a.clone()]);

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(1), Some(&b));
        assert!(pool.check_shapes(1).is_ok());
        assert!(pool.check_shapes(2).is_err());
    }
}
