//! optimization — local solvers and their unified error surface.
//!
//! Purpose
//! -------
//! Provide the numerical machinery behind the refiner: an Argmin-backed
//! L-BFGS minimizer for smooth costs (`unconstrained`) and an
//! augmented-Lagrangian wrapper that enforces equality and inequality
//! constraints on top of it (`constrained`).
//!
//! Key behaviors
//! -------------
//! - `unconstrained` bridges user objectives into Argmin, selects a line
//!   search, and normalizes results into `OptimOutcome`.
//! - `constrained` runs the outer multiplier/penalty loop and reports the
//!   final violation alongside the objective value.
//! - All failures are expressed as [`errors::OptError`] with the alias
//!   `OptResult<T>`; backend errors never leak.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Both layers **minimize**. Callers that want a maximum negate their
//!   objective before handing it over.
//!
//! Conventions
//! -----------
//! - Parameters and gradients are `ndarray` vectors (`Theta`, `Grad`).
//! - This module avoids I/O and logging; the bounds layer reports progress.

pub mod constrained;
pub mod errors;
pub mod unconstrained;
