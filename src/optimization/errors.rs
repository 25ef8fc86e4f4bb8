//! Error surface for the optimizer layer.
//!
//! Every failure that can happen while configuring or running the L-BFGS
//! inner optimizer is normalized into [`OptError`]. Argmin's own error type is
//! converted at the boundary (`From<argmin::core::Error>`), so callers of the
//! EM driver never see backend-specific errors.
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// The objective has no analytic gradient; finite differences are used.
    GradientNotImplemented,

    /// Gradient length differs from the weight vector length.
    GradientDimMismatch { expected: usize, found: usize },

    /// A gradient element is NaN or infinite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- OptimOptions ----
    /// Gradient tolerance must be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost-change tolerance must be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Iteration cap must be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one stopping rule is required.
    NoTolerancesProvided,

    /// Unknown line-search name.
    InvalidLineSearch { name: String, reason: &'static str },

    /// L-BFGS history must hold at least one pair.
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    /// Objective evaluated to NaN or ±∞.
    NonFiniteCost { value: f64 },

    /// Weight vector has the wrong dimension for the objective.
    WeightDimMismatch { expected: usize, found: usize },

    /// Weight vector contains a non-finite entry.
    InvalidWeight { index: usize, value: f64 },

    /// Objective rejected its data payload.
    InvalidObjectiveData { reason: String },

    // ---- Optimizer outcome ----
    /// Best point reported by the solver contains a non-finite entry.
    InvalidOptimum { index: usize, value: f64, reason: &'static str },

    /// Solver finished without reporting a best point.
    MissingOptimum,

    // ---- Argmin ----
    InvalidParameter { text: String },
    NotImplemented { text: String },
    NotInitialized { text: String },
    ConditionViolated { text: String },
    CheckPointNotFound { text: String },
    PotentialBug { text: String },
    ImpossibleError { text: String },
    /// Any other error raised inside argmin (line search, observers, ...).
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost-change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => write!(f, "No tolerances provided"),
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::NonFiniteCost { value } => write!(f, "Non-finite objective value: {value}"),
            OptError::WeightDimMismatch { expected, found } => {
                write!(f, "Weight dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidWeight { index, value } => {
                write!(f, "Invalid weight at index {index}: {value}, must be finite")
            }
            OptError::InvalidObjectiveData { reason } => {
                write!(f, "Invalid objective data: {reason}")
            }
            OptError::InvalidOptimum { index, value, reason } => {
                write!(f, "Invalid optimum at index {index}: {value}: {reason}")
            }
            OptError::MissingOptimum => write!(f, "Solver reported no best point"),
            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::CheckPointNotFound { text } => write!(f, "Checkpoint not found: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::ImpossibleError { text } => write!(f, "Impossible error: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),
            OptError::UnknownError => write!(f, "Unknown error"),
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own objective travel through argmin untouched.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
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
