//! mixture — GEV mixture primitives.
//!
//! Purpose
//! -------
//! Evaluate the closed-form quantities the bounds search needs: component
//! CDFs at the quantile locations, a per-component validity score against
//! the observations, and the scalar target functional at a query point.
//!
//! Key behaviors
//! -------------
//! - [`gev`] holds the scalar GEV CDF and density.
//! - [`MixtureEvaluator`] is the seam the rest of the crate depends on;
//!   [`GevMixture`] is the default implementation.
//! - [`params`] fixes the `(location, scale, shape)` row layout and the flat
//!   vector layout shared with the optimizer.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every function here is pure. Out-of-support inputs saturate rather
//!   than error, so optimizer iterates that briefly leave the admissible
//!   region still evaluate finitely.

pub mod evaluator;
pub mod gev;
pub mod params;

pub use self::evaluator::{GevMixture, MixtureEvaluator};
