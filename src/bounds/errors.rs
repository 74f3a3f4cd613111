//! Errors for the bounds search (inputs, options, persistence, and
//! escalation from the sweep).
//!
//! [`BoundsError`] is the single error type of the `bounds` module. Optimizer
//! failures that reach it are wrapped in [`BoundsError::Optimizer`]; numerical
//! breakdowns of a single seed never do, because the refiner absorbs them.
//!
//! ## Conventions
//! - **Indices are 0-based**.
//! - Retryable conditions (no usable seed, empty ranking) are not errors;
//!   they are reported through `RefineOutcome::NoResult` and only become
//!   [`BoundsError::RetryBudgetExhausted`] once the sweep gives up.
use crate::{bounds::ranker::Direction, optimization::errors::OptError};

/// Result alias for the bounds search.
pub type BoundsResult<T> = Result<T, BoundsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundsError {
    // ---- Input data ----
    /// Observation sample is empty.
    EmptyObservations,

    /// An observation is NaN/±inf.
    NonFiniteObservation { index: usize, value: f64 },

    /// No quantile constraints were supplied.
    EmptyConstraints,

    /// `quantiles` and `alphas` differ in length.
    ConstraintLengthMismatch { quantiles: usize, alphas: usize },

    /// A quantile location is NaN/±inf.
    NonFiniteQuantile { index: usize, value: f64 },

    /// A target probability is outside `[0, 1]` or not finite.
    AlphaOutOfRange { index: usize, value: f64 },

    /// A constraint row does not have exactly two entries `[alpha, value]`.
    MalformedConstraintRow { index: usize, len: usize },

    // ---- Candidates ----
    /// A candidate does not have the component layout of the context.
    CandidateShape { expected_components: usize, rows: usize, cols: usize, weights: usize },

    /// The generator spent its draw budget before collecting enough candidates.
    GenerationExhausted { accepted: usize, requested: usize, draws: usize },

    // ---- Options ----
    /// A generator, refiner or sweep option is out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    /// The query grid cannot be built from the given range.
    InvalidQueryGrid { start: f64, stop: f64, step: f64 },

    // ---- Sweep ----
    /// No bound could be recorded at a query point within the retry budget.
    RetryBudgetExhausted { index: usize, x: f64, direction: Direction, attempts: usize },

    /// Non-numerical optimizer failure (configuration or dimension error).
    Optimizer(OptError),

    // ---- Persistence ----
    /// Reading or writing a file failed.
    Io { path: String, reason: String },

    /// A file could not be encoded or decoded.
    Serialization { path: String, reason: String },
}

impl std::error::Error for BoundsError {}

impl std::fmt::Display for BoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input data ----
            BoundsError::EmptyObservations => write!(f, "Observation sample is empty."),
            BoundsError::NonFiniteObservation { index, value } => {
                write!(f, "Observation at index {index} is non-finite: {value}")
            }
            BoundsError::EmptyConstraints => write!(f, "No quantile constraints supplied."),
            BoundsError::ConstraintLengthMismatch { quantiles, alphas } => {
                write!(
                    f,
                    "Quantile constraint length mismatch: {quantiles} quantiles, {alphas} alphas"
                )
            }
            BoundsError::NonFiniteQuantile { index, value } => {
                write!(f, "Quantile at index {index} is non-finite: {value}")
            }
            BoundsError::AlphaOutOfRange { index, value } => {
                write!(f, "Alpha at index {index} must lie in [0, 1]; got: {value}")
            }
            BoundsError::MalformedConstraintRow { index, len } => {
                write!(f, "Constraint row {index} has {len} entries; expected [alpha, value]")
            }

            // ---- Candidates ----
            BoundsError::CandidateShape { expected_components, rows, cols, weights } => {
                write!(
                    f,
                    "Candidate shape mismatch: expected {expected_components} components, \
                     got theta {rows}x{cols} and {weights} weights"
                )
            }
            BoundsError::GenerationExhausted { accepted, requested, draws } => {
                write!(
                    f,
                    "Candidate generation exhausted after {draws} draws: \
                     accepted {accepted} of {requested}"
                )
            }

            // ---- Options ----
            BoundsError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }
            BoundsError::InvalidQueryGrid { start, stop, step } => {
                write!(f, "Invalid query grid: start {start}, stop {stop}, step {step}")
            }

            // ---- Sweep ----
            BoundsError::RetryBudgetExhausted { index, x, direction, attempts } => {
                write!(
                    f,
                    "No {direction} bound at query point {index} (x = {x}) after {attempts} attempts"
                )
            }
            BoundsError::Optimizer(err) => write!(f, "Optimizer failure: {err}"),

            // ---- Persistence ----
            BoundsError::Io { path, reason } => write!(f, "I/O error at '{path}': {reason}"),
            BoundsError::Serialization { path, reason } => {
                write!(f, "Serialization error at '{path}': {reason}")
            }
        }
    }
}

impl From<OptError> for BoundsError {
    fn from(err: OptError) -> Self {
        BoundsError::Optimizer(err)
    }
}
