//! Powell–Hestenes–Rockafellar augmented Lagrangian.
//!
//! For fixed multipliers `λ` (equalities), `μ ≥ 0` (inequalities) and
//! penalty `ρ > 0`:
//!
//! ```text
//! L(x) = f(x) + λ·h(x) + ρ/2 ‖h(x)‖² + 1/(2ρ) Σⱼ (max(0, μⱼ − ρ gⱼ(x))² − μⱼ²)
//! ```
//!
//! `L` is continuously differentiable whenever `f`, `h`, `g` are, so the
//! L-BFGS layer can minimize it directly.
use crate::optimization::{
    constrained::problem::{ConstrainedProblem, validate_constraints},
    errors::OptResult,
    unconstrained::{Cost, Objective, Theta},
};
use ndarray::{Array1, Zip};

/// Augmented Lagrangian of a [`ConstrainedProblem`] at fixed multipliers.
pub struct AugmentedLagrangian<'p, P: ConstrainedProblem> {
    pub problem: &'p P,
    pub lambda: Array1<f64>,
    pub mu: Array1<f64>,
    pub rho: f64,
}

impl<'p, P: ConstrainedProblem> AugmentedLagrangian<'p, P> {
    pub fn new(problem: &'p P, lambda: Array1<f64>, mu: Array1<f64>, rho: f64) -> Self {
        Self { problem, lambda, mu, rho }
    }

    /// Penalty and multiplier terms for already-evaluated constraints.
    pub fn penalty(&self, h: &Array1<f64>, g: &Array1<f64>) -> f64 {
        let rho = self.rho;
        let eq = self.lambda.dot(h) + 0.5 * rho * h.dot(h);
        let ineq = Zip::from(&self.mu).and(g).fold(0.0, |acc, &mu, &gj| {
            let shifted = (mu - rho * gj).max(0.0);
            acc + shifted * shifted - mu * mu
        });
        eq + ineq / (2.0 * rho)
    }

    /// First-order multiplier update: `λ += ρh`, `μ = max(0, μ − ρg)`.
    pub fn updated_multipliers(
        &self, h: &Array1<f64>, g: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let lambda = &self.lambda + &(h * self.rho);
        let mut mu = self.mu.clone();
        Zip::from(&mut mu).and(g).for_each(|m, &gj| *m = (*m - self.rho * gj).max(0.0));
        (lambda, mu)
    }
}

impl<'p, P: ConstrainedProblem> Objective for AugmentedLagrangian<'p, P> {
    type Data = P::Data;

    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let f = self.problem.value(x, data)?;
        let h = self.problem.equalities(x, data)?;
        let g = self.problem.inequalities(x, data)?;
        validate_constraints(&h, self.lambda.len(), "equality")?;
        validate_constraints(&g, self.mu.len(), "inequality")?;
        Ok(f + self.penalty(&h, &g))
    }

    fn check(&self, x: &Theta, data: &Self::Data) -> OptResult<()> {
        self.problem.check(x, data)
    }
}
