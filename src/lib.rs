//! mixture_bounds — sup/inf bounds of a tail functional over
//! quantile-constrained GEV mixtures.
//!
//! Purpose
//! -------
//! Serve as the crate root for the library and the `mixture_bounds`
//! binary. Given an observation sample and `n` quantile constraints, the
//! crate estimates at each query point the largest and smallest expected
//! exceedance count attainable by a mixture of `n + 1` GEV components that
//! reproduces every constraint exactly.
//!
//! Key behaviors
//! -------------
//! - `mixture`: closed-form GEV primitives behind the `MixtureEvaluator`
//!   seam.
//! - `bounds`: candidate generation, the persisted pool, seed ranking,
//!   constrained refinement and the sweep driver.
//! - `optimization`: the L-BFGS layer and the augmented-Lagrangian solver
//!   used by the refiner.
//! - `config`: TOML run configuration for the binary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Library code never panics on bad input; every fallible entry point
//!   returns `BoundsResult` or `OptResult`.
//! - Runs are single-threaded and reproducible for a fixed generator seed.
//!
//! Downstream usage
//! ----------------
//! - Library callers build a `bounds::BoundsContext`, fill a store with
//!   `bounds::CandidateGenerator`, and call `bounds::run_sweep`.
//! - The binary wires the same steps to JSON files and a TOML config.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/integration_bounds_pipeline.rs`
//!   runs the full pipeline on synthetic data with known constraints.

pub mod bounds;
pub mod config;
pub mod mixture;
pub mod optimization;
