//! Run configuration read from TOML.
//!
//! Every section and every field is optional; missing values take the
//! defaults of the corresponding options struct. Conversion into validated
//! options happens in the `*_options` methods, so a malformed file fails
//! before any work starts.
//!
//! ```toml
//! [generator]
//! target_count = 100000
//! location_spread = 40.0
//! seed = 7
//!
//! [refiner]
//! max_iter = 250
//! line_searcher = "MoreThuente"
//!
//! [sweep]
//! seed_count = 100
//! max_retries = 5
//! sup_reuse = true
//!
//! [grid]
//! start = 40.0
//! stop = 400.0
//! step = 10.0
//! ```
use crate::{
    bounds::{
        errors::{BoundsError, BoundsResult},
        options::{GeneratorOptions, RefinerOptions, SweepOptions},
        sweep::query_grid,
    },
    optimization::{
        constrained::ConstrainedOptions,
        unconstrained::{LineSearcher, MinimizeOptions, Tolerances},
    },
};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub generator: GeneratorSection,
    pub refiner: RefinerSection,
    pub sweep: SweepSection,
    pub grid: GridSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSection {
    pub target_count: usize,
    pub location_spread: f64,
    pub scale_bound: f64,
    pub shape_bound: f64,
    pub det_tol: f64,
    pub residual_tol: f64,
    pub max_draws_per_candidate: usize,
    pub seed: Option<u64>,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        let d = GeneratorOptions::default();
        Self {
            target_count: d.target_count,
            location_spread: d.location_spread,
            scale_bound: d.scale_bound,
            shape_bound: d.shape_bound,
            det_tol: d.det_tol,
            residual_tol: d.residual_tol,
            max_draws_per_candidate: d.max_draws_per_candidate,
            seed: d.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefinerSection {
    pub max_iter: usize,
    pub tol_grad: f64,
    pub tol_cost: f64,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
    pub max_outer: usize,
    pub penalty_init: f64,
    pub penalty_growth: f64,
    pub penalty_max: f64,
    pub violation_ratio: f64,
    pub feasibility_tol: f64,
    pub step_tol: f64,
}

impl Default for RefinerSection {
    fn default() -> Self {
        let d = ConstrainedOptions::default();
        Self {
            max_iter: d.inner.tols.max_iter.unwrap_or(250),
            tol_grad: d.inner.tols.tol_grad.unwrap_or(1e-8),
            tol_cost: d.inner.tols.tol_cost.unwrap_or(1e-8),
            line_searcher: d.inner.line_searcher,
            lbfgs_mem: d.inner.lbfgs_mem,
            max_outer: d.max_outer,
            penalty_init: d.penalty_init,
            penalty_growth: d.penalty_growth,
            penalty_max: d.penalty_max,
            violation_ratio: d.violation_ratio,
            feasibility_tol: d.feasibility_tol,
            step_tol: d.step_tol,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    pub seed_count: usize,
    pub max_retries: usize,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub regenerate_count: usize,
    pub sup_reuse: bool,
    pub sup_reuse_threshold: f64,
    pub checkpoint: bool,
}

impl Default for SweepSection {
    fn default() -> Self {
        let d = SweepOptions::default();
        Self {
            seed_count: d.seed_count,
            max_retries: d.max_retries,
            backoff_base_ms: d.backoff_base_ms,
            backoff_max_ms: d.backoff_max_ms,
            regenerate_count: d.regenerate_count,
            sup_reuse: d.sup_reuse_threshold.is_some(),
            sup_reuse_threshold: d.sup_reuse_threshold.unwrap_or(1.0),
            checkpoint: d.checkpoint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self { start: 40.0, stop: 400.0, step: 10.0 }
    }
}

impl RunConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// - [`BoundsError::Serialization`] for syntax errors or unknown keys.
    pub fn from_toml_str(text: &str, origin: &str) -> BoundsResult<Self> {
        toml::from_str(text).map_err(|e| BoundsError::Serialization {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    /// - [`BoundsError::Io`] when the file cannot be read.
    /// - [`BoundsError::Serialization`] when it cannot be parsed.
    pub fn load(path: &Path) -> BoundsResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| BoundsError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// # Errors
    /// - [`BoundsError::InvalidOption`] for out-of-range generator settings.
    pub fn generator_options(&self) -> BoundsResult<GeneratorOptions> {
        let g = &self.generator;
        GeneratorOptions::new(
            g.target_count,
            g.location_spread,
            g.scale_bound,
            g.shape_bound,
            g.det_tol,
            g.residual_tol,
            g.max_draws_per_candidate,
            g.seed,
        )
    }

    /// # Errors
    /// - [`BoundsError::Optimizer`] wrapping the tolerance, memory or
    ///   penalty validation error.
    pub fn refiner_options(&self) -> BoundsResult<RefinerOptions> {
        let r = &self.refiner;
        let tols = Tolerances::new(Some(r.tol_grad), Some(r.tol_cost), Some(r.max_iter))?;
        let inner = MinimizeOptions::new(tols, r.line_searcher, r.lbfgs_mem)?;
        Ok(ConstrainedOptions::new(
            inner,
            r.max_outer,
            r.penalty_init,
            r.penalty_growth,
            r.penalty_max,
            r.violation_ratio,
            r.feasibility_tol,
            r.step_tol,
        )?)
    }

    /// # Errors
    /// - Refiner errors, then [`BoundsError::InvalidOption`] for sweep
    ///   settings.
    pub fn sweep_options(&self) -> BoundsResult<SweepOptions> {
        let s = &self.sweep;
        SweepOptions::new(
            s.seed_count,
            s.max_retries,
            s.backoff_base_ms,
            s.backoff_max_ms,
            s.regenerate_count,
            s.sup_reuse.then_some(s.sup_reuse_threshold),
            s.checkpoint,
            self.refiner_options()?,
        )
    }

    /// # Errors
    /// - [`BoundsError::InvalidQueryGrid`] for an empty or malformed range.
    pub fn query_points(&self) -> BoundsResult<Vec<f64>> {
        query_grid(self.grid.start, self.grid.stop, self.grid.step)
    }
}
