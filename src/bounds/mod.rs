//! bounds — quantile-constrained sup/inf bounds of a mixture functional.
//!
//! Purpose
//! -------
//! Estimate, at many query points, the largest and smallest value a target
//! functional can take over mixtures of `n + 1` GEV components that match
//! `n` quantile constraints exactly.
//!
//! Key behaviors
//! -------------
//! - [`generator`] samples components at random and solves a linear system
//!   for weights that satisfy the constraints, discarding singular or
//!   infeasible draws.
//! - [`candidate`] holds the resulting mixtures in an append-only pool;
//!   [`store`] persists the pool, seed sets and bounds.
//! - [`ranker`] scores the pool at a query point and selects the best `K`
//!   seeds per direction.
//! - [`refiner`] runs the augmented-Lagrangian solver from every seed under
//!   the same constraints and keeps the best feasible value.
//! - [`sweep`] drives ranking and refinement over the query points with
//!   bounded, backed-off recovery through pool regeneration.
//!
//! Invariants & assumptions
//! ------------------------
//! - All components receive the immutable [`data::BoundsContext`]
//!   explicitly; nothing is captured globally.
//! - Everything is single-threaded and synchronous.
//!
//! Conventions
//! -----------
//! - Errors are [`errors::BoundsError`] with alias `BoundsResult<T>`.
//! - Progress is logged with `tracing`: `info!` per query point, `debug!`
//!   per seed, `warn!` on recoveries.

pub mod candidate;
pub mod data;
pub mod errors;
pub mod generator;
pub mod options;
pub mod ranker;
pub mod refiner;
pub mod store;
pub mod sweep;

pub use self::candidate::{Candidate, CandidatePool};
pub use self::data::{BoundsContext, Observations, QuantileConstraints};
pub use self::errors::{BoundsError, BoundsResult};
pub use self::generator::{CandidateGenerator, CandidateSource};
pub use self::options::{GeneratorOptions, RefinerOptions, SweepOptions};
pub use self::ranker::{Direction, RankedSeed, rank_seeds};
pub use self::refiner::{BoundPoint, RefineOutcome, refine};
pub use self::store::{JsonStore, MemoryStore, PoolStore};
pub use self::sweep::{BoundSequence, SweepReport, query_grid, run_sweep};
