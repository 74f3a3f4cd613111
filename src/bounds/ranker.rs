//! Candidate ranking: pick the most promising seeds at a query point.
//!
//! Every pool candidate is scored by the raw target functional. Scores that
//! cannot seed a meaningful search are filtered out (see
//! [`Direction::admits`]), then the best `k` are selected with a partial
//! partition and only those `k` are sorted. Equal scores keep pool order.
use crate::{
    bounds::{
        candidate::{Candidate, CandidatePool},
        data::BoundsContext,
    },
    mixture::MixtureEvaluator,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Extremal direction of a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sup,
    Inf,
}

impl Direction {
    /// Whether a functional value may seed a search in this direction.
    ///
    /// NaN is never admitted. `Sup` also drops exact zeros (uninformative
    /// for maximization) but keeps infinities; `Inf` drops ±∞.
    pub fn admits(self, value: f64) -> bool {
        match self {
            Direction::Sup => !value.is_nan() && value != 0.0,
            Direction::Inf => value.is_finite(),
        }
    }

    /// Order so that the better value comes first.
    fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Sup => b.total_cmp(&a),
            Direction::Inf => a.total_cmp(&b),
        }
    }

    /// Whether `candidate` improves on `incumbent` in this direction.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        self.compare(candidate, incumbent) == Ordering::Less
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Sup => write!(f, "sup"),
            Direction::Inf => write!(f, "inf"),
        }
    }
}

/// A selected seed with its pool index and raw functional value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSeed {
    pub index: usize,
    pub value: f64,
    pub candidate: Candidate,
}

/// Select the `k` best admissible candidates at `x`, best first.
///
/// Returns fewer than `k` seeds when fewer are admissible, and an empty
/// vector when none are. Deterministic for a fixed pool and query point.
pub fn rank_seeds<E: MixtureEvaluator>(
    ctx: &BoundsContext<E>, x: f64, pool: &CandidatePool, k: usize, direction: Direction,
) -> Vec<RankedSeed> {
    let mut scored: Vec<(usize, f64)> = pool
        .iter()
        .enumerate()
        .map(|(index, c)| (index, c.functional(ctx, x)))
        .filter(|&(_, value)| direction.admits(value))
        .collect();

    let admitted = scored.len();
    let order = |a: &(usize, f64), b: &(usize, f64)| {
        direction.compare(a.1, b.1).then_with(|| a.0.cmp(&b.0))
    };
    if k == 0 {
        scored.clear();
    } else if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, order);
        scored.truncate(k);
    }
    scored.sort_unstable_by(order);

    debug!(x, %direction, pool = pool.len(), admitted, selected = scored.len(), "ranked seeds");

    scored
        .into_iter()
        .filter_map(|(index, value)| {
            pool.get(index).map(|c| RankedSeed { index, value, candidate: c.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounds::data::{Observations, QuantileConstraints},
        mixture::MixtureEvaluator,
    };
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests use a stub evaluator whose functional is the location of
    // the first component, so scores can be set directly.
    // -------------------------------------------------------------------------

    struct LocationScore;

    impl MixtureEvaluator for LocationScore {
        fn cdf_matrix(&self, q: &Array1<f64>, theta: &Array2<f64>) -> Array2<f64> {
            Array2::zeros((q.len(), theta.nrows()))
        }
        fn validity(&self, _: &Array1<f64>, theta: &Array2<f64>) -> Array1<f64> {
            Array1::ones(theta.nrows())
        }
        fn functional(&self, _: f64, theta: &Array2<f64>, _: &Array1<f64>, _: &Array1<f64>) -> f64 {
            theta[[0, 0]]
        }
    }

    fn context() -> BoundsContext<LocationScore> {
        let constraints = QuantileConstraints::new(array![0.0], array![0.5]).unwrap();
        BoundsContext::new(constraints, Observations::new(array![1.0]).unwrap(), LocationScore)
    }

    fn pool(scores: &[f64]) -> CandidatePool {
        scores
            .iter()
            .map(|&s| Candidate::new(array![[s, 1.0, 0.0], [0.0, 1.0, 0.0]], array![0.5, 0.5]))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .into()
    }

    #[test]
    // Purpose
    // -------
    // Sup seeds drop NaN and exact zeros, keep +∞, and come best first.
    fn rank_sup_filters_and_orders() {
        let p = pool(&[3.0, f64::NAN, 0.0, f64::INFINITY, 5.0, 1.0]);
        let seeds = rank_seeds(&context(), 0.0, &p, 3, Direction::Sup);

        let idx: Vec<usize> = seeds.iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![3, 4, 0]);
        assert!(seeds.iter().all(|s| !s.value.is_nan() && s.value != 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Inf seeds drop NaN and infinities and keep zero.
    fn rank_inf_filters_and_orders() {
        let p = pool(&[3.0, f64::NEG_INFINITY, 0.0, f64::INFINITY, f64::NAN, -1.0]);
        let seeds = rank_seeds(&context(), 0.0, &p, 10, Direction::Inf);

        let idx: Vec<usize> = seeds.iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![5, 2, 0]);
        assert!(seeds.iter().all(|s| s.value.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Ties are broken by pool index and repeated calls agree exactly.
    fn rank_is_deterministic_with_ties() {
        let p = pool(&[2.0, 7.0, 2.0, 7.0, 2.0]);
        let first = rank_seeds(&context(), 0.0, &p, 3, Direction::Sup);
        let second = rank_seeds(&context(), 0.0, &p, 3, Direction::Sup);

        assert_eq!(first, second);
        let idx: Vec<usize> = first.iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![1, 3, 0]);
    }

    #[test]
    // Purpose
    // -------
    // A pool with fewer admissible candidates than `k` returns all of them;
    // a pool with none returns nothing.
    fn rank_returns_all_when_fewer_than_k() {
        let p = pool(&[0.0, 4.0, f64::NAN]);
        assert_eq!(rank_seeds(&context(), 0.0, &p, 100, Direction::Sup).len(), 1);

        let empty = pool(&[0.0, f64::NAN]);
        assert!(rank_seeds(&context(), 0.0, &empty, 5, Direction::Sup).is_empty());
        assert!(rank_seeds(&context(), 0.0, &p, 0, Direction::Sup).is_empty());
    }

    #[test]
    fn direction_improves_respects_orientation() {
        assert!(Direction::Sup.improves(2.0, 1.0));
        assert!(Direction::Inf.improves(1.0, 2.0));
        assert!(!Direction::Inf.improves(2.0, 2.0));
    }
}
