//! Layout of mixture parameters and the flat optimizer vector.
//!
//! A mixture of `m = n + 1` components is described by
//! - `theta`: an `m × 3` matrix with rows `(location, scale, shape)`, and
//! - `weights`: a length-`m` probability vector.
//!
//! The optimizer works on the flat vector
//! `[θ₀₀, θ₀₁, θ₀₂, θ₁₀, …, θ_{m−1,2}, p₀, …, p_{m−1}]` of length `4m`.
use crate::optimization::errors::{OptError, OptResult};
use ndarray::{Array1, Array2, s};

/// Parameters per component: location, scale, shape.
pub const PARAMS_PER_COMPONENT: usize = 3;

/// Column of `theta` holding the location.
pub const LOCATION: usize = 0;
/// Column of `theta` holding the scale.
pub const SCALE: usize = 1;
/// Column of `theta` holding the shape.
pub const SHAPE: usize = 2;

/// Length of the flat vector for `n_components` components.
pub fn flat_len(n_components: usize) -> usize {
    n_components * (PARAMS_PER_COMPONENT + 1)
}

/// Concatenate row-major `theta` and `weights` into one vector.
pub fn flatten(theta: &Array2<f64>, weights: &Array1<f64>) -> Array1<f64> {
    theta.iter().chain(weights.iter()).copied().collect()
}

/// Inverse of [`flatten`].
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] when `x.len() != flat_len(n_components)`.
pub fn split(x: &Array1<f64>, n_components: usize) -> OptResult<(Array2<f64>, Array1<f64>)> {
    let expected = flat_len(n_components);
    if x.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: x.len() });
    }
    let n_theta = n_components * PARAMS_PER_COMPONENT;
    let theta = x
        .slice(s![..n_theta])
        .to_owned()
        .into_shape((n_components, PARAMS_PER_COMPONENT))
        .map_err(|_| OptError::ThetaLengthMismatch { expected, actual: x.len() })?;
    let weights = x.slice(s![n_theta..]).to_owned();
    Ok((theta, weights))
}

/// Positions of the scale parameters inside the flat vector.
pub fn scale_positions(n_components: usize) -> impl Iterator<Item = usize> {
    (0..n_components).map(|j| j * PARAMS_PER_COMPONENT + SCALE)
}
