//! Constrained local refinement of ranked seeds.
//!
//! Purpose
//! -------
//! Starting from each seed, search nearby admissible mixtures for the
//! extremal functional value at a query point while keeping the quantile
//! and simplex constraints satisfied.
//!
//! Key behaviors
//! -------------
//! - [`MixtureProblem`] expresses the search on the flat vector
//!   `[theta..., weights...]`: the objective is `−functional` for `Sup` and
//!   `functional` for `Inf`; equalities are `Σp − 1` and
//!   `F(quantiles)·p − alphas` recomputed from the current `theta`;
//!   inequalities keep every weight and every scale non-negative.
//! - Seeds whose validity is zero for every component are skipped.
//! - Each seed contributes the better of its own value and its refined
//!   value. A refined point only counts when it is feasible and, once its
//!   weights and scales are projected back to non-negative values and the
//!   weights renormalized, still meets `feasibility_tol`. Recorded
//!   arguments therefore lie exactly on the simplex, and the result is
//!   never worse than the best non-degenerate seed.
//! - Numerical optimizer failures are counted per seed; configuration and
//!   dimension errors abort with [`BoundsError::Optimizer`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Seeds come from the ranker and have the component count of the
//!   context.
//! - [`RefineOutcome::NoResult`] is retryable; it is not an error.
use crate::{
    bounds::{
        candidate::Candidate,
        data::BoundsContext,
        errors::BoundsResult,
        options::RefinerOptions,
        ranker::{Direction, RankedSeed},
    },
    mixture::{MixtureEvaluator, params},
    optimization::{
        constrained::{ConstrainedProblem, solve_constrained},
        errors::{OptError, OptResult},
        unconstrained::{Theta, validation::validate_theta_input},
    },
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bound value at a query point with the flat mixture vector attaining it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundPoint {
    pub value: f64,
    pub argument: Array1<f64>,
    /// Pool index of the seed the point was refined from.
    pub seed_index: usize,
}

/// Tagged result of refining one seed set.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    Found(BoundPoint),
    /// No seed produced a usable value.
    NoResult { skipped: usize, failed: usize },
}

/// Bound search at a fixed query point, as a constrained problem.
pub struct MixtureProblem<'c, E> {
    ctx: &'c BoundsContext<E>,
    x: f64,
    direction: Direction,
}

impl<'c, E: MixtureEvaluator> MixtureProblem<'c, E> {
    pub fn new(ctx: &'c BoundsContext<E>, x: f64, direction: Direction) -> Self {
        Self { ctx, x, direction }
    }

    /// Raw functional of the mixture encoded by the flat vector `v`.
    pub fn functional(&self, v: &Theta) -> OptResult<f64> {
        let (theta, weights) = params::split(v, self.ctx.n_components())?;
        Ok(self.ctx.evaluator.functional(self.x, &theta, &weights, self.ctx.data()))
    }
}

impl<'c, E: MixtureEvaluator> ConstrainedProblem for MixtureProblem<'c, E> {
    type Data = ();

    fn value(&self, v: &Theta, _: &()) -> OptResult<f64> {
        let value = self.functional(v)?;
        Ok(match self.direction {
            Direction::Sup => -value,
            Direction::Inf => value,
        })
    }

    fn equalities(&self, v: &Theta, _: &()) -> OptResult<Array1<f64>> {
        let (theta, weights) = params::split(v, self.ctx.n_components())?;
        let cdf = self.ctx.evaluator.cdf_matrix(self.ctx.constraints.quantiles(), &theta);
        let matched = cdf.dot(&weights) - self.ctx.constraints.alphas();
        Ok(std::iter::once(weights.sum() - 1.0).chain(matched.iter().copied()).collect())
    }

    fn inequalities(&self, v: &Theta, _: &()) -> OptResult<Array1<f64>> {
        let m = self.ctx.n_components();
        let expected = params::flat_len(m);
        if v.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: v.len() });
        }
        let weights = v.iter().skip(m * params::PARAMS_PER_COMPONENT).copied();
        let scales = params::scale_positions(m).map(|i| v[i]);
        Ok(weights.chain(scales).collect())
    }

    fn check(&self, v: &Theta, _: &()) -> OptResult<()> {
        let expected = params::flat_len(self.ctx.n_components());
        if v.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: v.len() });
        }
        validate_theta_input(v)
    }
}

/// Refine every seed and keep the best bound in `direction`.
///
/// # Errors
/// - [`BoundsError::Optimizer`](crate::bounds::errors::BoundsError::Optimizer)
///   for optimizer errors that are not numerical (see
///   [`OptError::is_numerical`]).
pub fn refine<E: MixtureEvaluator>(
    ctx: &BoundsContext<E>, x: f64, seeds: &[RankedSeed], direction: Direction,
    opts: &RefinerOptions,
) -> BoundsResult<RefineOutcome> {
    let problem = MixtureProblem::new(ctx, x, direction);
    let mut best: Option<BoundPoint> = None;
    let (mut skipped, mut failed) = (0_usize, 0_usize);

    for seed in seeds {
        let validity = ctx.evaluator.validity(ctx.data(), seed.candidate.theta());
        if validity.iter().all(|&v| v == 0.0) {
            skipped += 1;
            debug!(x, %direction, seed = seed.index, "skipping degenerate seed");
            continue;
        }

        let start = seed.candidate.flatten();
        let seed_value = seed.candidate.functional(ctx, x);
        let mut local = direction.admits(seed_value).then(|| BoundPoint {
            value: seed_value,
            argument: start.clone(),
            seed_index: seed.index,
        });

        match solve_constrained(&problem, start, &(), opts) {
            Ok(out) if out.feasible => {
                let projected = Candidate::projected(&out.x, ctx.n_components())?
                    .filter(|c| c.max_residual(ctx) <= opts.feasibility_tol);
                match projected {
                    Some(candidate) => {
                        let value = candidate.functional(ctx, x);
                        debug!(
                            x,
                            %direction,
                            seed = seed.index,
                            seed_value,
                            value,
                            outer = out.outer_iterations,
                            "refined seed"
                        );
                        let better =
                            local.as_ref().map_or(true, |b| direction.improves(value, b.value));
                        if direction.admits(value) && better {
                            local = Some(BoundPoint {
                                value,
                                argument: candidate.flatten(),
                                seed_index: seed.index,
                            });
                        }
                    }
                    None => debug!(
                        x,
                        %direction,
                        seed = seed.index,
                        "projected point violates constraints; keeping seed"
                    ),
                }
            }
            Ok(out) => {
                debug!(
                    x,
                    %direction,
                    seed = seed.index,
                    violation = out.max_violation,
                    "refined point infeasible; keeping seed"
                );
            }
            Err(err) if err.is_numerical() => {
                failed += 1;
                debug!(x, %direction, seed = seed.index, error = %err, "refinement failed");
            }
            Err(err) => return Err(err.into()),
        }

        if let Some(point) = local {
            if best.as_ref().map_or(true, |b| direction.improves(point.value, b.value)) {
                best = Some(point);
            }
        }
    }

    Ok(match best {
        Some(point) => RefineOutcome::Found(point),
        None => RefineOutcome::NoResult { skipped, failed },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounds::{
            data::{Observations, QuantileConstraints},
            errors::BoundsError,
        },
        mixture::GevMixture,
        optimization::{constrained::ConstrainedOptions, unconstrained::MinimizeOptions},
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Objective sign, constraint layout and shape checks of
    //   `MixtureProblem`.
    // - Skipping of degenerate seeds and the `NoResult` sentinel.
    // - Monotone improvement over the raw seed values.
    // - Fatal propagation of configuration errors.
    // -------------------------------------------------------------------------

    /// One constraint F(0) = 0.5 on data spread over [−2, 2].
    fn context() -> BoundsContext<GevMixture> {
        let constraints = QuantileConstraints::new(array![0.0], array![0.5]).unwrap();
        let observations = Observations::new(Array1::linspace(-2.0, 2.0, 21)).unwrap();
        BoundsContext::new(constraints, observations, GevMixture)
    }

    /// Two Gumbel components at −1 and 1 with weights matching F(0) = 0.5.
    fn seed(index: usize) -> RankedSeed {
        let theta = array![[-1.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let ctx = context();
        let cdf = ctx.evaluator.cdf_matrix(ctx.constraints.quantiles(), &theta);
        let (a, b) = (cdf[[0, 0]], cdf[[0, 1]]);
        let p0 = (0.5 - b) / (a - b);
        let candidate = Candidate::new(theta, array![p0, 1.0 - p0]).unwrap();
        let value = candidate.functional(&ctx, 1.0);
        RankedSeed { index, value, candidate }
    }

    fn fast_options() -> RefinerOptions {
        let mut inner = MinimizeOptions::default();
        inner.tols.max_iter = Some(100);
        ConstrainedOptions { inner, max_outer: 8, ..ConstrainedOptions::default() }
    }

    #[test]
    // Purpose
    // -------
    // The objective flips sign for Sup and the constraints vanish at a
    // consistent candidate.
    fn mixture_problem_signs_and_constraints() {
        let ctx = context();
        let s = seed(0);
        let v = s.candidate.flatten();

        let sup = MixtureProblem::new(&ctx, 1.0, Direction::Sup);
        let inf = MixtureProblem::new(&ctx, 1.0, Direction::Inf);

        assert!((sup.value(&v, &()).unwrap() + s.value).abs() < 1e-12);
        assert!((inf.value(&v, &()).unwrap() - s.value).abs() < 1e-12);

        let h = sup.equalities(&v, &()).unwrap();
        assert_eq!(h.len(), 2);
        assert!(h.iter().all(|r| r.abs() < 1e-12));

        let g = sup.inequalities(&v, &()).unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g[2], 1.0);
        assert!(g.iter().all(|&x| x >= 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Vectors of the wrong length are rejected by `check`.
    fn mixture_problem_check_rejects_wrong_length() {
        let ctx = context();
        let problem = MixtureProblem::new(&ctx, 0.0, Direction::Inf);
        assert!(matches!(
            problem.check(&array![1.0, 2.0], &()),
            Err(OptError::ThetaLengthMismatch { expected: 8, actual: 2 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Seeds whose components all miss the data are skipped, and a seed set
    // with nothing left yields the `NoResult` sentinel.
    fn refine_skips_degenerate_seeds() {
        let ctx = context();
        // ξ = 1 puts both lower endpoints at 9, above every observation.
        let theta = array![[10.0, 1.0, 1.0], [10.0, 1.0, 1.0]];
        let candidate = Candidate::new(theta, array![0.5, 0.5]).unwrap();
        let degenerate = RankedSeed { index: 0, value: 1.0, candidate };

        let out = refine(&ctx, 1.0, &[degenerate], Direction::Sup, &fast_options()).unwrap();
        assert_eq!(out, RefineOutcome::NoResult { skipped: 1, failed: 0 });

        let empty = refine(&ctx, 1.0, &[], Direction::Inf, &fast_options()).unwrap();
        assert_eq!(empty, RefineOutcome::NoResult { skipped: 0, failed: 0 });
    }

    #[test]
    // Purpose
    // -------
    // Refined bounds are never worse than the seeds they start from, and
    // the returned argument still satisfies the constraints.
    fn refine_improves_on_seed_values() {
        let ctx = context();
        let seeds = [seed(4)];

        for direction in [Direction::Sup, Direction::Inf] {
            let out = refine(&ctx, 1.0, &seeds, direction, &fast_options()).unwrap();
            let RefineOutcome::Found(point) = out else {
                panic!("expected a bound for {direction}");
            };
            assert!(!direction.improves(seeds[0].value, point.value));
            assert_eq!(point.seed_index, 4);

            let c = Candidate::from_flat(&point.argument, 2).unwrap();
            assert!(c.max_residual(&ctx) < 1e-5, "{direction}: {}", c.max_residual(&ctx));
        }
    }

    #[test]
    // Purpose
    // -------
    // Recorded arguments keep non-negative weights summing to one and
    // non-negative scales, so recorded values stay within [0, N], also where
    // the infimum approaches zero.
    fn refine_records_arguments_on_the_simplex() {
        let ctx = context();
        let n = ctx.observations.len() as f64;
        let seeds = [seed(0)];

        for x in [1.0, 3.0] {
            for direction in [Direction::Sup, Direction::Inf] {
                let RefineOutcome::Found(point) =
                    refine(&ctx, x, &seeds, direction, &ConstrainedOptions::default()).unwrap()
                else {
                    panic!("expected a bound for {direction} at {x}");
                };
                let c = Candidate::from_flat(&point.argument, 2).unwrap();

                assert!(c.weights().iter().all(|&p| p >= 0.0), "{:?}", c.weights());
                assert!((c.weights().sum() - 1.0).abs() < 1e-12);
                assert!(c.theta().column(params::SCALE).iter().all(|&s| s >= 0.0));
                let value = point.value;
                assert!((-1e-9..=n + 1e-9).contains(&value), "{direction} at {x}: {value}");
                assert!((c.functional(&ctx, x) - point.value).abs() < 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // A seed whose component count disagrees with the context is a
    // programming error and aborts the refinement.
    fn refine_propagates_configuration_errors() {
        let ctx = context();
        let theta = array![[0.0, 1.0, 0.0]];
        let candidate = Candidate::new(theta, array![1.0]).unwrap();
        let bad = RankedSeed { index: 0, value: 1.0, candidate };

        let err = refine(&ctx, 1.0, &[bad], Direction::Sup, &fast_options()).unwrap_err();
        assert!(matches!(err, BoundsError::Optimizer(OptError::ThetaLengthMismatch { .. })));
    }
}
