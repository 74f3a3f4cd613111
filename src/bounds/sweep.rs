//! Sweep driver: sup/inf bounds over an ordered sequence of query points.
//!
//! Purpose
//! -------
//! For every query point, rank seeds and refine them, first towards the
//! supremum and then towards the infimum, and accumulate the results into
//! two [`BoundSequence`]s.
//!
//! Key behaviors
//! -------------
//! - Per point and direction: rank → save seeds → refine → record. When the
//!   refiner reports `NoResult`, the driver recovers: it waits with
//!   exponential backoff, regenerates `regenerate_count` candidates through
//!   the [`CandidateSource`], appends them to the store, reloads the pool and
//!   retries the same point.
//! - Recovery is bounded. After `max_retries` recoveries at one point the
//!   sweep stops with [`BoundsError::RetryBudgetExhausted`].
//! - With `sup_reuse_threshold = Some(t)`, once the previous supremum is
//!   below `t` it is reused for later points without recomputation. The
//!   default exceedance functional is non-increasing in `x`, so the reused
//!   value stays an upper bound there.
//! - With `checkpoint` set, partial bounds are saved after every point; the
//!   final report is always saved.
//!
//! Invariants & assumptions
//! ------------------------
//! - `report.query_points`, `report.sup` and `report.inf` always have equal
//!   lengths, one entry per processed point.
//! - The pool only grows during a sweep.
use crate::{
    bounds::{
        candidate::CandidatePool,
        data::BoundsContext,
        errors::{BoundsError, BoundsResult},
        generator::CandidateSource,
        options::SweepOptions,
        ranker::{Direction, rank_seeds},
        refiner::{BoundPoint, RefineOutcome, refine},
        store::PoolStore,
    },
    mixture::MixtureEvaluator,
};
use serde::{Deserialize, Serialize};
use std::{thread, time::Duration};
use tracing::{debug, info, warn};

/// Bounds recorded for one direction, indexed by query point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundSequence {
    points: Vec<BoundPoint>,
}

impl BoundSequence {
    pub fn push(&mut self, point: BoundPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&BoundPoint> {
        self.points.last()
    }

    pub fn get(&self, index: usize) -> Option<&BoundPoint> {
        self.points.get(index)
    }

    /// Bound values in query-point order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Flat mixture vectors attaining the bounds, in query-point order.
    pub fn arguments(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(|p| p.argument.to_vec()).collect()
    }
}

/// Output of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub query_points: Vec<f64>,
    pub sup: BoundSequence,
    pub inf: BoundSequence,
    /// Pool regenerations performed over the whole sweep.
    pub recoveries: usize,
}

/// Half-open grid `start, start + step, …` strictly below `stop`.
///
/// # Errors
/// - [`BoundsError::InvalidQueryGrid`] unless all inputs are finite,
///   `step > 0` and `start < stop`.
pub fn query_grid(start: f64, stop: f64, step: f64) -> BoundsResult<Vec<f64>> {
    let valid = start.is_finite() && stop.is_finite() && step.is_finite();
    if !(valid && step > 0.0 && start < stop) {
        return Err(BoundsError::InvalidQueryGrid { start, stop, step });
    }
    // Guards against 40 + 36·10 landing a hair below 400.
    let limit = stop - step * 1e-9;
    Ok((0_u64..).map(|i| start + i as f64 * step).take_while(|&x| x < limit).collect())
}

/// Run the sweep over `query_points`.
///
/// The pool is loaded from `store` at the start; recoveries append to it.
///
/// # Errors
/// - [`BoundsError::RetryBudgetExhausted`] when a point cannot be bounded.
/// - Store, generation and non-numerical optimizer errors are propagated.
pub fn run_sweep<E, S, G>(
    ctx: &BoundsContext<E>, store: &mut S, source: &mut G, query_points: &[f64],
    opts: &SweepOptions,
) -> BoundsResult<SweepReport>
where
    E: MixtureEvaluator,
    S: PoolStore,
    G: CandidateSource<E>,
{
    let mut pool = store.load_pool()?;
    pool.check_shapes(ctx.n_components())?;
    info!(points = query_points.len(), pool = pool.len(), "starting sweep");

    let mut report = SweepReport::default();
    let mut recoveries = 0;

    for (index, &x) in query_points.iter().enumerate() {
        let reused = match (opts.sup_reuse_threshold, report.sup.last()) {
            (Some(threshold), Some(prev)) if prev.value < threshold => Some(prev.clone()),
            _ => None,
        };
        let sup = match reused {
            Some(prev) => {
                debug!(index, x, value = prev.value, "reusing previous supremum");
                prev
            }
            None => bound_at(
                ctx,
                store,
                source,
                &mut pool,
                index,
                x,
                Direction::Sup,
                opts,
                &mut recoveries,
            )?,
        };
        let inf = bound_at(
            ctx,
            store,
            source,
            &mut pool,
            index,
            x,
            Direction::Inf,
            opts,
            &mut recoveries,
        )?;

        info!(index, x, sup = sup.value, inf = inf.value, "recorded bounds");
        report.query_points.push(x);
        report.sup.push(sup);
        report.inf.push(inf);
        report.recoveries = recoveries;

        if opts.checkpoint {
            store.save_bounds(&report)?;
        }
    }

    store.save_bounds(&report)?;
    info!(points = report.query_points.len(), recoveries, "sweep finished");
    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn bound_at<E, S, G>(
    ctx: &BoundsContext<E>, store: &mut S, source: &mut G, pool: &mut CandidatePool,
    index: usize, x: f64, direction: Direction, opts: &SweepOptions, recoveries: &mut usize,
) -> BoundsResult<BoundPoint>
where
    E: MixtureEvaluator,
    S: PoolStore,
    G: CandidateSource<E>,
{
    let mut attempt = 0;
    loop {
        let seeds = rank_seeds(ctx, x, pool, opts.seed_count, direction);
        store.save_seeds(direction, &seeds)?;

        match refine(ctx, x, &seeds, direction, &opts.refiner)? {
            RefineOutcome::Found(point) => return Ok(point),
            RefineOutcome::NoResult { skipped, failed } => {
                if attempt >= opts.max_retries {
                    return Err(BoundsError::RetryBudgetExhausted {
                        index,
                        x,
                        direction,
                        attempts: attempt + 1,
                    });
                }
                warn!(
                    index,
                    x,
                    %direction,
                    seeds = seeds.len(),
                    skipped,
                    failed,
                    attempt,
                    "no usable seed; regenerating candidates"
                );
            }
        }

        let delay = opts.backoff_ms(attempt);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
        match source.generate(ctx, opts.regenerate_count) {
            Ok(fresh) => {
                store.append_pool(&fresh)?;
                *pool = store.load_pool()?;
                pool.check_shapes(ctx.n_components())?;
            }
            Err(err @ BoundsError::GenerationExhausted { .. }) => {
                warn!(index, x, %direction, error = %err, "regeneration ran out of draws");
            }
            Err(err) => return Err(err),
        }
        *recoveries += 1;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The default range 40..400 step 10 gives 36 points, stop excluded.
    fn query_grid_is_half_open() {
        let grid = query_grid(40.0, 400.0, 10.0).unwrap();
        assert_eq!(grid.len(), 36);
        assert_eq!(grid[0], 40.0);
        assert_eq!(grid[35], 390.0);

        assert_eq!(query_grid(0.0, 0.5, 1.0).unwrap(), vec![0.0]);
    }

    #[test]
    // Purpose
    // -------
    // Empty, reversed or non-finite ranges are rejected.
    fn query_grid_rejects_bad_ranges() {
        assert!(query_grid(10.0, 10.0, 1.0).is_err());
        assert!(query_grid(10.0, 0.0, 1.0).is_err());
        assert!(query_grid(0.0, 10.0, 0.0).is_err());
        assert!(query_grid(0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Sequences expose values and arguments in insertion order.
    fn bound_sequence_projects_values_and_arguments() {
        let mut seq = BoundSequence::default();
        seq.push(BoundPoint { value: 2.0, argument: array![1.0, 2.0], seed_index: 0 });
        seq.push(BoundPoint { value: 1.0, argument: array![3.0, 4.0], seed_index: 1 });

        assert_eq!(seq.values(), vec![2.0, 1.0]);
        assert_eq!(seq.arguments(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(seq.last().map(|p| p.seed_index), Some(1));
    }
}
