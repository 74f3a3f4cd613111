//! unconstrained::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the L-BFGS layer
//! so the rest of the optimization code stays agnostic to `ndarray` and
//! Argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are column vectors with length equal to the number
//!   of free parameters.
//! - `Cost` is the scalar being **minimized**; callers that want a maximum
//!   negate their objective before handing it over.
//! - `DEFAULT_LBFGS_MEM` encodes the typical history size for L-BFGS;
//!   callers may override this via per-run options.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector `∇c(θ)`, same shape as `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value minimized by the solver.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
