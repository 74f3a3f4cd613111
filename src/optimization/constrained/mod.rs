//! constrained — augmented-Lagrangian solver on top of the L-BFGS layer.
//!
//! Purpose
//! -------
//! Minimize a smooth objective `f(x)` subject to equality constraints
//! `h(x) = 0` and inequality constraints `g(x) ≥ 0`. Problems implement
//! [`ConstrainedProblem`]; [`solve_constrained`] drives the outer loop and
//! delegates every subproblem to `optimization::unconstrained::minimize`.
//!
//! Key behaviors
//! -------------
//! - [`AugmentedLagrangian`] turns a constrained problem plus multipliers
//!   into an unconstrained [`Objective`](crate::optimization::unconstrained::Objective).
//! - Multipliers follow the first-order update; the penalty grows only when
//!   the constraint violation stalls.
//! - The outcome reports feasibility explicitly; an infeasible final iterate
//!   is a valid return value, not an error.
//!
//! Conventions
//! -----------
//! - Constraint vectors keep the length they had at the starting point;
//!   a change is reported as `OptError::ConstraintDimMismatch`.
//! - No logging happens here; callers report progress.

pub mod lagrangian;
pub mod options;
pub mod problem;
pub mod solve;

pub use self::lagrangian::AugmentedLagrangian;
pub use self::options::ConstrainedOptions;
pub use self::problem::{ConstrainedProblem, max_violation};
pub use self::solve::{ConstrainedOutcome, solve_constrained};
