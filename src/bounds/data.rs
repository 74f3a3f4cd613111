//! Validated inputs of the bounds search.
//!
//! Purpose
//! -------
//! Hold the observation sample and the quantile constraint set, and bundle
//! them with a mixture evaluator into the immutable [`BoundsContext`] that
//! every component receives explicitly.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations are non-empty and finite.
//! - Constraints are non-empty, `quantiles.len() == alphas.len()`, every
//!   quantile is finite and every alpha lies in `[0, 1]`.
//! - A context with `n` constraints describes mixtures of `n + 1` components.
use crate::{
    bounds::errors::{BoundsError, BoundsResult},
    mixture::MixtureEvaluator,
};
use ndarray::Array1;
use statrs::statistics::Statistics;

/// Observed sample with cached summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    values: Array1<f64>,
    mean: f64,
    std_dev: f64,
}

impl Observations {
    /// Validate and wrap a sample.
    ///
    /// # Errors
    /// - [`BoundsError::EmptyObservations`] for an empty sample.
    /// - [`BoundsError::NonFiniteObservation`] for the first NaN/±inf value.
    pub fn new(values: Array1<f64>) -> BoundsResult<Self> {
        if values.is_empty() {
            return Err(BoundsError::EmptyObservations);
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(BoundsError::NonFiniteObservation { index, value });
        }
        let mean = values.iter().mean();
        let std_dev = if values.len() > 1 { values.iter().std_dev() } else { 0.0 };
        Ok(Self { values, mean, std_dev })
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (0 for a single observation).
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

/// Quantile-matching constraints `F(quantiles[i]) = alphas[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileConstraints {
    quantiles: Array1<f64>,
    alphas: Array1<f64>,
}

impl QuantileConstraints {
    /// Validate a constraint set.
    ///
    /// # Errors
    /// - [`BoundsError::EmptyConstraints`], [`BoundsError::ConstraintLengthMismatch`],
    ///   [`BoundsError::NonFiniteQuantile`], [`BoundsError::AlphaOutOfRange`].
    pub fn new(quantiles: Array1<f64>, alphas: Array1<f64>) -> BoundsResult<Self> {
        if quantiles.len() != alphas.len() {
            return Err(BoundsError::ConstraintLengthMismatch {
                quantiles: quantiles.len(),
                alphas: alphas.len(),
            });
        }
        if quantiles.is_empty() {
            return Err(BoundsError::EmptyConstraints);
        }
        if let Some((index, &value)) = quantiles.iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(BoundsError::NonFiniteQuantile { index, value });
        }
        if let Some((index, &value)) =
            alphas.iter().enumerate().find(|(_, a)| !(0.0..=1.0).contains(*a))
        {
            return Err(BoundsError::AlphaOutOfRange { index, value });
        }
        Ok(Self { quantiles, alphas })
    }

    /// Build from `[alpha, value]` rows, the on-disk layout.
    ///
    /// # Errors
    /// - [`BoundsError::MalformedConstraintRow`] for a row without exactly
    ///   two entries, plus everything [`QuantileConstraints::new`] reports.
    pub fn from_pairs(rows: &[Vec<f64>]) -> BoundsResult<Self> {
        let mut alphas = Vec::with_capacity(rows.len());
        let mut quantiles = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match row.as_slice() {
                [alpha, value] => {
                    alphas.push(*alpha);
                    quantiles.push(*value);
                }
                _ => return Err(BoundsError::MalformedConstraintRow { index, len: row.len() }),
            }
        }
        Self::new(Array1::from(quantiles), Array1::from(alphas))
    }

    pub fn quantiles(&self) -> &Array1<f64> {
        &self.quantiles
    }

    pub fn alphas(&self) -> &Array1<f64> {
        &self.alphas
    }

    /// Number of constraints `n`.
    pub fn len(&self) -> usize {
        self.quantiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantiles.is_empty()
    }

    /// Number of mixture components, `n + 1`.
    pub fn n_components(&self) -> usize {
        self.quantiles.len() + 1
    }
}

/// Immutable inputs shared by the generator, ranker, refiner and sweep.
#[derive(Debug, Clone)]
pub struct BoundsContext<E> {
    pub constraints: QuantileConstraints,
    pub observations: Observations,
    pub evaluator: E,
}

impl<E: MixtureEvaluator> BoundsContext<E> {
    pub fn new(constraints: QuantileConstraints, observations: Observations, evaluator: E) -> Self {
        Self { constraints, observations, evaluator }
    }

    pub fn n_components(&self) -> usize {
        self.constraints.n_components()
    }

    pub fn data(&self) -> &Array1<f64> {
        self.observations.values()
    }
}
