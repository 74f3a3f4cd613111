//! Persistence of the candidate pool, seed sets and bound sequences.
//!
//! Purpose
//! -------
//! Decouple generation, ranking and the sweep through an explicit snapshot
//! interface, [`PoolStore`]. [`JsonStore`] keeps one JSON file per artifact
//! under a root directory; [`MemoryStore`] keeps owned snapshots in memory
//! for tests and embedded use.
//!
//! Key behaviors
//! -------------
//! - The pool is append-only through [`PoolStore::append_pool`]: new
//!   candidates are added after the stored ones, never replacing them.
//! - Seed sets are overwritten per query point and direction.
//! - Bounds are written as separate value/argument arrays per direction plus
//!   the query points, so partial sweeps can be checkpointed.
//! - File writes go through a temporary file and a rename, so an interrupted
//!   write never leaves a truncated artifact behind.
use crate::bounds::{
    candidate::{Candidate, CandidatePool},
    data::{Observations, QuantileConstraints},
    errors::{BoundsError, BoundsResult},
    ranker::{Direction, RankedSeed},
    sweep::SweepReport,
};
use ndarray::Array1;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub const POOL_FILE: &str = "candidate_pool.json";
pub const SEEDS_SUP_FILE: &str = "seeds_sup.json";
pub const SEEDS_INF_FILE: &str = "seeds_inf.json";
pub const SUP_VALUES_FILE: &str = "sup_values.json";
pub const INF_VALUES_FILE: &str = "inf_values.json";
pub const SUP_ARGUMENTS_FILE: &str = "sup_arguments.json";
pub const INF_ARGUMENTS_FILE: &str = "inf_arguments.json";
pub const QUERY_POINTS_FILE: &str = "query_points.json";

/// Snapshot interface between the generator, the ranker and the sweep.
pub trait PoolStore {
    /// Current pool; empty when nothing has been stored yet.
    fn load_pool(&self) -> BoundsResult<CandidatePool>;

    /// Replace the stored pool.
    fn save_pool(&mut self, pool: &CandidatePool) -> BoundsResult<()>;

    /// Add `new` after the stored candidates.
    fn append_pool(&mut self, new: &[Candidate]) -> BoundsResult<()> {
        let mut pool = self.load_pool()?;
        pool.extend(new.iter().cloned());
        self.save_pool(&pool)
    }

    /// Overwrite the seed set of `direction`.
    fn save_seeds(&mut self, direction: Direction, seeds: &[RankedSeed]) -> BoundsResult<()>;

    /// Last seed set saved for `direction`; empty when none was saved.
    fn load_seeds(&self, direction: Direction) -> BoundsResult<Vec<RankedSeed>>;

    /// Persist the (possibly partial) bound sequences.
    fn save_bounds(&mut self, report: &SweepReport) -> BoundsResult<()>;
}

/// JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Use `root` as the artifact directory, creating it if needed.
    ///
    /// # Errors
    /// - [`BoundsError::Io`] when the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> BoundsResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn seeds_file(direction: Direction) -> &'static str {
        match direction {
            Direction::Sup => SEEDS_SUP_FILE,
            Direction::Inf => SEEDS_INF_FILE,
        }
    }
}

impl PoolStore for JsonStore {
    fn load_pool(&self) -> BoundsResult<CandidatePool> {
        let path = self.path(POOL_FILE);
        if !path.exists() {
            return Ok(CandidatePool::new());
        }
        read_json(&path)
    }

    fn save_pool(&mut self, pool: &CandidatePool) -> BoundsResult<()> {
        write_json(&self.path(POOL_FILE), pool)
    }

    fn save_seeds(&mut self, direction: Direction, seeds: &[RankedSeed]) -> BoundsResult<()> {
        write_json(&self.path(Self::seeds_file(direction)), &seeds)
    }

    fn load_seeds(&self, direction: Direction) -> BoundsResult<Vec<RankedSeed>> {
        let path = self.path(Self::seeds_file(direction));
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    fn save_bounds(&mut self, report: &SweepReport) -> BoundsResult<()> {
        write_json(&self.path(QUERY_POINTS_FILE), &report.query_points)?;
        write_json(&self.path(SUP_VALUES_FILE), &report.sup.values())?;
        write_json(&self.path(INF_VALUES_FILE), &report.inf.values())?;
        write_json(&self.path(SUP_ARGUMENTS_FILE), &report.sup.arguments())?;
        write_json(&self.path(INF_ARGUMENTS_FILE), &report.inf.arguments())
    }
}

/// In-memory snapshots.
///
/// `bound_saves` counts calls to `save_bounds`, so checkpointing can be
/// observed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub pool: CandidatePool,
    pub seeds_sup: Vec<RankedSeed>,
    pub seeds_inf: Vec<RankedSeed>,
    pub report: Option<SweepReport>,
    pub bound_saves: usize,
}

impl MemoryStore {
    pub fn new(pool: CandidatePool) -> Self {
        Self { pool, ..Self::default() }
    }
}

impl PoolStore for MemoryStore {
    fn load_pool(&self) -> BoundsResult<CandidatePool> {
        Ok(self.pool.clone())
    }

    fn save_pool(&mut self, pool: &CandidatePool) -> BoundsResult<()> {
        self.pool = pool.clone();
        Ok(())
    }

    fn append_pool(&mut self, new: &[Candidate]) -> BoundsResult<()> {
        self.pool.extend(new.iter().cloned());
        Ok(())
    }

    fn save_seeds(&mut self, direction: Direction, seeds: &[RankedSeed]) -> BoundsResult<()> {
        match direction {
            Direction::Sup => self.seeds_sup = seeds.to_vec(),
            Direction::Inf => self.seeds_inf = seeds.to_vec(),
        }
        Ok(())
    }

    fn load_seeds(&self, direction: Direction) -> BoundsResult<Vec<RankedSeed>> {
        Ok(match direction {
            Direction::Sup => self.seeds_sup.clone(),
            Direction::Inf => self.seeds_inf.clone(),
        })
    }

    fn save_bounds(&mut self, report: &SweepReport) -> BoundsResult<()> {
        self.report = Some(report.clone());
        self.bound_saves += 1;
        Ok(())
    }
}

/// Read a JSON array of observations.
///
/// # Errors
/// - [`BoundsError::Io`] / [`BoundsError::Serialization`] on read failures.
/// - Validation errors from [`Observations::new`].
pub fn load_observations(path: &Path) -> BoundsResult<Observations> {
    let values: Vec<f64> = read_json(path)?;
    Observations::new(Array1::from(values))
}

/// Read a JSON array of `[alpha, value]` pairs.
///
/// # Errors
/// - [`BoundsError::Io`] / [`BoundsError::Serialization`] on read failures.
/// - Validation errors from [`QuantileConstraints::from_pairs`].
pub fn load_constraints(path: &Path) -> BoundsResult<QuantileConstraints> {
    let rows: Vec<Vec<f64>> = read_json(path)?;
    QuantileConstraints::from_pairs(&rows)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> BoundsResult<T> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| BoundsError::Serialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> BoundsResult<()> {
    let tmp = path.with_extension("json.tmp");
    let file = File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|e| BoundsError::Serialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    writer.flush().map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> BoundsError {
    BoundsError::Io { path: path.display().to_string(), reason: err.to_string() }
}
