//! Mixture evaluator seam and the default GEV implementation.
use crate::mixture::{
    gev,
    params::{LOCATION, SCALE, SHAPE},
};
use ndarray::{Array1, Array2};

/// Pure mixture primitives consumed by the generator, ranker and refiner.
///
/// Implementations must be deterministic and side-effect free. `theta` is
/// always an `m × 3` matrix of `(location, scale, shape)` rows and `weights`
/// has length `m`; callers validate shapes before calling.
pub trait MixtureEvaluator {
    /// Component CDFs at the quantile locations.
    ///
    /// Entry `(i, j)` is `F_j(quantiles[i])`, so the result is
    /// `quantiles.len() × m`.
    fn cdf_matrix(&self, quantiles: &Array1<f64>, theta: &Array2<f64>) -> Array2<f64>;

    /// Per-component validity against the observations.
    ///
    /// A zero entry marks a component that cannot have produced the data.
    fn validity(&self, data: &Array1<f64>, theta: &Array2<f64>) -> Array1<f64>;

    /// Target functional of the mixture at query point `x`.
    fn functional(
        &self, x: f64, theta: &Array2<f64>, weights: &Array1<f64>, data: &Array1<f64>,
    ) -> f64;
}

/// Mixture of GEV components.
///
/// - Validity of a component is the geometric mean of its density over the
///   observations, `exp(mean ln f_j(xᵢ))`. It is 0 as soon as one observation
///   lies outside the component's support.
/// - The functional is the expected number of exceedances of `x` in a sample
///   the size of `data`: `N · (1 − Σⱼ pⱼ F_j(x))`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GevMixture;

impl GevMixture {
    /// Mixture CDF `Σⱼ pⱼ F_j(x)`.
    pub fn mixture_cdf(&self, x: f64, theta: &Array2<f64>, weights: &Array1<f64>) -> f64 {
        theta
            .rows()
            .into_iter()
            .zip(weights.iter())
            .map(|(row, &p)| p * gev::cdf(x, row[LOCATION], row[SCALE], row[SHAPE]))
            .sum()
    }
}

impl MixtureEvaluator for GevMixture {
    fn cdf_matrix(&self, quantiles: &Array1<f64>, theta: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn((quantiles.len(), theta.nrows()), |(i, j)| {
            gev::cdf(quantiles[i], theta[[j, LOCATION]], theta[[j, SCALE]], theta[[j, SHAPE]])
        })
    }

    fn validity(&self, data: &Array1<f64>, theta: &Array2<f64>) -> Array1<f64> {
        let n = data.len() as f64;
        theta
            .rows()
            .into_iter()
            .map(|row| {
                let total: f64 = data
                    .iter()
                    .map(|&x| gev::ln_pdf(x, row[LOCATION], row[SCALE], row[SHAPE]))
                    .sum();
                geometric_mean_density(total, n)
            })
            .collect()
    }

    fn functional(
        &self, x: f64, theta: &Array2<f64>, weights: &Array1<f64>, data: &Array1<f64>,
    ) -> f64 {
        data.len() as f64 * (1.0 - self.mixture_cdf(x, theta, weights))
    }
}

/// `exp(total / n)` for a summed log density over `n` observations.
///
/// An unbounded density (`+∞`) stays valid; only NaN maps to 0.
fn geometric_mean_density(total: f64, n: f64) -> f64 {
    let v = (total / n).exp();
    if v.is_nan() { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `cdf_matrix` lays out quantiles by row and components by column.
    fn cdf_matrix_has_quantile_rows() {
        let theta = array![[0.0, 1.0, 0.0], [5.0, 2.0, 0.1]];
        let q = array![-1.0, 0.0, 4.0];

        let m = GevMixture.cdf_matrix(&q, &theta);

        assert_eq!(m.dim(), (3, 2));
        assert!((m[[2, 1]] - gev::cdf(4.0, 5.0, 2.0, 0.1)).abs() < 1e-15);
        assert!((m[[1, 0]] - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Observations outside a component's support zero its validity only.
    fn validity_is_zero_outside_support() {
        // Component 0 (ξ = 1): support x > −1. Component 1: Gumbel, full line.
        let theta = array![[0.0, 1.0, 1.0], [0.0, 1.0, 0.0]];
        let data = array![-2.0, 0.0, 1.0];

        let v = GevMixture.validity(&data, &theta);

        assert_eq!(v[0], 0.0);
        assert!(v[1] > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Only a NaN log total is invalid: points outside the support give 0 and
    // an unbounded density at an endpoint stays valid.
    fn geometric_mean_density_keeps_unbounded_densities() {
        assert_eq!(geometric_mean_density(f64::INFINITY, 3.0), f64::INFINITY);
        assert_eq!(geometric_mean_density(f64::NEG_INFINITY, 3.0), 0.0);
        assert_eq!(geometric_mean_density(f64::NAN, 3.0), 0.0);
        assert!((geometric_mean_density(-3.0, 3.0) - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // The functional counts expected exceedances and decreases in x.
    fn functional_is_expected_exceedance_count() {
        let theta = array![[0.0, 1.0, 0.0], [3.0, 1.0, 0.0]];
        let weights = array![0.5, 0.5];
        let data = Array1::zeros(10);

        let f0 = GevMixture.functional(0.0, &theta, &weights, &data);
        let expected = 10.0 * (1.0 - GevMixture.mixture_cdf(0.0, &theta, &weights));
        assert!((f0 - expected).abs() < 1e-12);

        let f5 = GevMixture.functional(5.0, &theta, &weights, &data);
        assert!(f5 < f0);
        assert!(f5 > 0.0);
    }
}
