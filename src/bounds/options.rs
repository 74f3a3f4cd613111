//! Validated options for generation, refinement and the sweep.
//!
//! Every struct has a `new` that enforces its ranges and a `Default` that
//! passes the same checks.
use crate::{
    bounds::errors::{BoundsError, BoundsResult},
    optimization::constrained::ConstrainedOptions,
};

/// Documented minimum for `location_spread`; smaller spreads make most
/// draws singular or infeasible.
pub const MIN_LOCATION_SPREAD: f64 = 40.0;

/// Options of the candidate generator.
///
/// - `target_count`: candidates to generate when seeding an empty pool.
/// - `location_spread`: std-dev of the location draws around the data mean.
/// - `scale_bound`: scales are drawn from `U(0, scale_bound)`.
/// - `shape_bound`: shapes are drawn from `U(−shape_bound, shape_bound)`.
/// - `det_tol`: draws with `|det| ≤ det_tol` are rejected as singular.
/// - `residual_tol`: accepted weights must reproduce the constraints within
///   this tolerance.
/// - `max_draws_per_candidate`: draw budget is this times the requested count.
/// - `seed`: RNG seed; `None` draws one from the thread RNG.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    pub target_count: usize,
    pub location_spread: f64,
    pub scale_bound: f64,
    pub shape_bound: f64,
    pub det_tol: f64,
    pub residual_tol: f64,
    pub max_draws_per_candidate: usize,
    pub seed: Option<u64>,
}

impl GeneratorOptions {
    /// # Errors
    /// - [`BoundsError::InvalidOption`] for non-positive or non-finite
    ///   bounds, tolerances, or zero counts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target_count: usize, location_spread: f64, scale_bound: f64, shape_bound: f64,
        det_tol: f64, residual_tol: f64, max_draws_per_candidate: usize, seed: Option<u64>,
    ) -> BoundsResult<Self> {
        positive("location_spread", location_spread)?;
        positive("scale_bound", scale_bound)?;
        positive("shape_bound", shape_bound)?;
        positive("det_tol", det_tol)?;
        positive("residual_tol", residual_tol)?;
        at_least_one("target_count", target_count)?;
        at_least_one("max_draws_per_candidate", max_draws_per_candidate)?;
        Ok(Self {
            target_count,
            location_spread,
            scale_bound,
            shape_bound,
            det_tol,
            residual_tol,
            max_draws_per_candidate,
            seed,
        })
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            target_count: 100_000,
            location_spread: MIN_LOCATION_SPREAD,
            scale_bound: 1000.0,
            shape_bound: 1000.0,
            det_tol: 1e-10,
            residual_tol: 1e-8,
            max_draws_per_candidate: 10_000,
            seed: None,
        }
    }
}

/// Options of the constrained refiner: inner L-BFGS limits (250 iterations,
/// 1e-8 tolerances by default) plus the augmented-Lagrangian schedule.
pub type RefinerOptions = ConstrainedOptions;

/// Options of the sweep driver.
///
/// - `seed_count`: `K`, seeds ranked per query point and direction.
/// - `max_retries`: recoveries allowed per query point and direction before
///   the sweep escalates.
/// - `backoff_base_ms` / `backoff_max_ms`: exponential backoff before the
///   n-th retry, `min(base · 2ⁿ, max)` milliseconds.
/// - `regenerate_count`: candidates added to the pool per recovery.
/// - `sup_reuse_threshold`: once the previous sup value drops below this,
///   later query points reuse it. `None` always recomputes.
/// - `checkpoint`: persist partial bounds after every query point.
/// - `refiner`: options passed to every refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub seed_count: usize,
    pub max_retries: usize,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub regenerate_count: usize,
    pub sup_reuse_threshold: Option<f64>,
    pub checkpoint: bool,
    pub refiner: RefinerOptions,
}

impl SweepOptions {
    /// # Errors
    /// - [`BoundsError::InvalidOption`] for zero counts, a backoff ceiling
    ///   below its base, or a non-finite reuse threshold.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed_count: usize, max_retries: usize, backoff_base_ms: u64, backoff_max_ms: u64,
        regenerate_count: usize, sup_reuse_threshold: Option<f64>, checkpoint: bool,
        refiner: RefinerOptions,
    ) -> BoundsResult<Self> {
        at_least_one("seed_count", seed_count)?;
        at_least_one("regenerate_count", regenerate_count)?;
        if backoff_max_ms < backoff_base_ms {
            return Err(BoundsError::InvalidOption {
                name: "backoff_max_ms",
                value: backoff_max_ms as f64,
                reason: "Backoff ceiling must not be below the base delay.",
            });
        }
        if let Some(t) = sup_reuse_threshold {
            if !t.is_finite() {
                return Err(BoundsError::InvalidOption {
                    name: "sup_reuse_threshold",
                    value: t,
                    reason: "Threshold must be finite.",
                });
            }
        }
        Ok(Self {
            seed_count,
            max_retries,
            backoff_base_ms,
            backoff_max_ms,
            regenerate_count,
            sup_reuse_threshold,
            checkpoint,
            refiner,
        })
    }

    /// Delay before retry number `attempt` (0-based), in milliseconds.
    pub fn backoff_ms(&self, attempt: usize) -> u64 {
        let factor = 1_u64.checked_shl(attempt.min(63) as u32).unwrap_or(u64::MAX);
        self.backoff_base_ms.saturating_mul(factor).min(self.backoff_max_ms)
    }
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            seed_count: 100,
            max_retries: 5,
            backoff_base_ms: 50,
            backoff_max_ms: 1000,
            regenerate_count: 1000,
            sup_reuse_threshold: Some(1.0),
            checkpoint: true,
            refiner: RefinerOptions::default(),
        }
    }
}

fn positive(name: &'static str, value: f64) -> BoundsResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(BoundsError::InvalidOption {
            name,
            value,
            reason: "Value must be finite and strictly positive.",
        });
    }
    Ok(())
}

fn at_least_one(name: &'static str, value: usize) -> BoundsResult<()> {
    if value == 0 {
        return Err(BoundsError::InvalidOption {
            name,
            value: 0.0,
            reason: "Count must be at least one.",
        });
    }
    Ok(())
}
