//! Unified error surface for the optimization layer.
//!
//! Every failure raised while configuring or running the unconstrained
//! L-BFGS layer or the augmented-Lagrangian solver is normalized into
//! [`OptError`]. Backend `argmin` errors are mapped through
//! `From<argmin::core::Error>` so callers never see raw solver errors.
//!
//! Callers that retry on numerical trouble use [`OptError::is_numerical`] to
//! tell retryable numerical breakdowns apart from configuration mistakes.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,
    /// Invalid line searcher name.
    InvalidLineSearch { name: String, reason: &'static str },
    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem { mem: usize, reason: &'static str },
    /// Penalty schedule or feasibility settings of the constrained solver.
    InvalidPenalty { name: &'static str, value: f64, reason: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost { value: f64 },

    // ---- Constraints ----
    /// A constraint function returned a vector of unexpected length.
    ConstraintDimMismatch { kind: &'static str, expected: usize, found: usize },
    /// A constraint function returned a non-finite entry.
    NonFiniteConstraint { kind: &'static str, index: usize, value: f64 },
    /// Parameter vector does not have the length the problem expects.
    ThetaLengthMismatch { expected: usize, actual: usize },
    /// Parameter vector contains a non-finite entry.
    InvalidThetaInput { index: usize, value: f64 },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },
    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// Whether the error stems from the numerics of a particular run rather
    /// than from how the solver or problem was configured.
    ///
    /// Numerical errors (non-finite costs, failed line searches, backend
    /// breakdowns) depend on the starting point and are worth retrying from
    /// a different seed. Configuration errors (invalid tolerances, dimension
    /// mismatches) fail identically on every attempt.
    pub fn is_numerical(&self) -> bool {
        !matches!(
            self,
            OptError::GradientDimMismatch { .. }
                | OptError::InvalidTolGrad { .. }
                | OptError::InvalidTolCost { .. }
                | OptError::InvalidMaxIter { .. }
                | OptError::NoTolerancesProvided
                | OptError::InvalidLineSearch { .. }
                | OptError::InvalidLBFGSMem { .. }
                | OptError::InvalidPenalty { .. }
                | OptError::ConstraintDimMismatch { .. }
                | OptError::ThetaLengthMismatch { .. }
                | OptError::NotImplemented { .. }
        )
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::InvalidPenalty { name, value, reason } => {
                write!(f, "Invalid augmented Lagrangian setting {name} = {value}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Constraints ----
            OptError::ConstraintDimMismatch { kind, expected, found } => {
                write!(
                    f,
                    "{kind} constraint dimension mismatch: expected {expected}, found {found}"
                )
            }
            OptError::NonFiniteConstraint { kind, index, value } => {
                write!(f, "Non-finite {kind} constraint value at index {index}: {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own cost/gradient closures travel through
        // argmin boxed as `OptError`; recover them unchanged.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}
