//! Errors for log-linear grammar training.
//!
//! [`GridError`] covers malformed tables: ids outside the registries, bad
//! expected counts, or counts that do not fit the feature grid. [`EmError`]
//! wraps everything an EM iteration can fail with: the external
//! expected-counts provider, the inner optimizer, or invalid driver options.
//!
//! Conventions
//! -----------
//! - Ids are 0-based dense ids handed out by the index registries.
//! - Degenerate contexts (no scored decision) are *not* errors; they are
//!   represented as all-`-∞` theta rows.
use crate::optimization::errors::OptError;

/// Result alias for grid, theta and count operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result alias for EM driver operations.
pub type EmResult<T> = Result<T, EmError>;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Context id is not below the number of contexts.
    ContextOutOfRange { context: usize, len: usize },

    /// Decision id is not below the number of decisions.
    DecisionOutOfRange { decision: usize, len: usize },

    /// Feature id is not below the number of features.
    FeatureOutOfRange { feature: usize, len: usize },

    /// Expected counts must be finite and non-negative.
    InvalidCount { context: usize, decision: usize, value: f64 },

    /// Counts table was built for a different number of contexts.
    CountsShapeMismatch { expected: usize, found: usize },

    /// Positive expected count on a decision the grid does not offer.
    MassOnAbsentDecision { context: usize, decision: usize, count: f64 },

    /// Weight vector length differs from the number of features.
    WeightDimMismatch { expected: usize, found: usize },
}

impl std::error::Error for GridError {}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::ContextOutOfRange { context, len } => {
                write!(f, "Context id {context} out of range for {len} contexts")
            }
            GridError::DecisionOutOfRange { decision, len } => {
                write!(f, "Decision id {decision} out of range for {len} decisions")
            }
            GridError::FeatureOutOfRange { feature, len } => {
                write!(f, "Feature id {feature} out of range for {len} features")
            }
            GridError::InvalidCount { context, decision, value } => {
                write!(
                    f,
                    "Invalid expected count {value} at ({context}, {decision}): \
                     must be finite and >= 0"
                )
            }
            GridError::CountsShapeMismatch { expected, found } => {
                write!(f, "Counts cover {found} contexts, grid has {expected}")
            }
            GridError::MassOnAbsentDecision { context, decision, count } => {
                write!(
                    f,
                    "Expected count {count} on decision {decision}, \
                     which context {context} does not offer"
                )
            }
            GridError::WeightDimMismatch { expected, found } => {
                write!(f, "Weight dimension mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl From<GridError> for OptError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::WeightDimMismatch { expected, found } => {
                OptError::WeightDimMismatch { expected, found }
            }
            other => OptError::InvalidObjectiveData { reason: other.to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmError {
    /// The external expected-counts provider failed.
    ExpectedCounts { reason: String },

    /// The M-step optimizer failed.
    Optimizer(OptError),

    /// Malformed grid or counts.
    Grid(GridError),

    /// Initial weight vector does not match the feature count.
    InitialWeightsMismatch { expected: usize, found: usize },

    /// Driver iteration cap must be positive.
    InvalidMaxIterations { max_iterations: usize },

    /// Convergence tolerance must be finite and positive.
    InvalidTolerance { tol: f64 },

    /// The driver already failed and yields no further states.
    Halted,
}

impl std::error::Error for EmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmError::Optimizer(err) => Some(err),
            EmError::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmError::ExpectedCounts { reason } => write!(f, "E-step failed: {reason}"),
            EmError::Optimizer(err) => write!(f, "M-step failed: {err}"),
            EmError::Grid(err) => write!(f, "Invalid grid data: {err}"),
            EmError::InitialWeightsMismatch { expected, found } => {
                write!(f, "Initial weights have length {found}, expected {expected}")
            }
            EmError::InvalidMaxIterations { max_iterations } => {
                write!(f, "Invalid maximum EM iterations {max_iterations}: must be > 0")
            }
            EmError::InvalidTolerance { tol } => {
                write!(f, "Invalid EM tolerance {tol}: must be finite and > 0")
            }
            EmError::Halted => write!(f, "EM driver halted after an earlier failure"),
        }
    }
}

impl From<OptError> for EmError {
    fn from(err: OptError) -> Self {
        EmError::Optimizer(err)
    }
}

impl From<GridError> for EmError {
    fn from(err: GridError) -> Self {
        EmError::Grid(err)
    }
}
