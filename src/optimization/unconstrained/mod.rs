//! unconstrained — argmin-powered L-BFGS minimizer.
//!
//! Purpose
//! -------
//! Provide a small, Argmin-backed layer for **minimizing** a smooth cost
//! `c(θ)`. Callers implement [`Objective`] and invoke [`minimize`]; the
//! augmented-Lagrangian solver in `optimization::constrained` uses this
//! layer for every inner subproblem.
//!
//! Key behaviors
//! -------------
//! - Bridge user objectives into Argmin via [`adapter::ArgMinAdapter`],
//!   with finite-difference gradients when no analytic gradient exists.
//! - Select an L-BFGS solver via [`builders`] based on [`LineSearcher`].
//! - Execute via [`run::run_lbfgs`] and normalize into [`OptimOutcome`].
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`); costs are plain `f64`.
//! - Errors bubble up as `OptResult<T>`; this module never intentionally
//!   panics.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{LineSearcher, MinimizeOptions, Objective, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};
