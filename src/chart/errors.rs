//! Errors for chart posteriors and batch scoring.
//!
//! Conventions
//! -----------
//! - Spans are half-open `[begin, end)` over word positions `0..=len`.
//! - Label ids are fine (grammar) ids unless a variant says coarse.
//! - [`ChartError::UnparsableSentence`] is recoverable: batch scoring
//!   replaces the sentence's scorer with the identity scorer and continues.

/// Result alias for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// The sentence log-probability is not finite (no parse, or overflow).
    /// `tokens` is the rendered input sentence, empty when the charts did
    /// not carry it.
    UnparsableSentence { tokens: Vec<String>, log_prob: f64 },

    /// Span does not satisfy `begin <= end <= len`.
    SpanOutOfRange { begin: usize, end: usize, len: usize },

    /// Fine label id is not below the grammar's label count.
    LabelOutOfRange { label: usize, len: usize },

    /// Inside and outside charts disagree on sentence length or labels.
    ChartShapeMismatch {
        inside: (usize, usize),
        outside: (usize, usize),
    },

    /// Grammar, charts and projection do not share one fine label count.
    LabelCountMismatch { grammar: usize, charts: usize, projection: usize },

    /// Projection maps a fine label outside `0..num_coarse`.
    InvalidProjection { fine: usize, coarse: usize, num_coarse: usize },

    /// Projection leaves a coarse label without a preimage.
    ProjectionNotSurjective { coarse: usize },

    /// Priors were supplied for a different number of sentences.
    PriorCountMismatch { sentences: usize, priors: usize },

    /// The external parser failed for a reason other than "no parse".
    Parser { reason: String },

    /// The rayon worker pool could not be created.
    WorkerPool { reason: String },
}

impl std::error::Error for ChartError {}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::UnparsableSentence { tokens, log_prob } => {
                write!(
                    f,
                    "Unparsable sentence [{}] ({} words): log-probability {log_prob}",
                    tokens.join(" "),
                    tokens.len()
                )
            }
            ChartError::SpanOutOfRange { begin, end, len } => {
                write!(f, "Span [{begin}, {end}) out of range for a sentence of {len} words")
            }
            ChartError::LabelOutOfRange { label, len } => {
                write!(f, "Label id {label} out of range for {len} labels")
            }
            ChartError::ChartShapeMismatch { inside, outside } => {
                write!(
                    f,
                    "Inside chart is {} words x {} labels, outside chart is {} x {}",
                    inside.0, inside.1, outside.0, outside.1
                )
            }
            ChartError::LabelCountMismatch { grammar, charts, projection } => {
                write!(
                    f,
                    "Label count mismatch: grammar {grammar}, charts {charts}, \
                     projection {projection}"
                )
            }
            ChartError::InvalidProjection { fine, coarse, num_coarse } => {
                write!(f, "Fine label {fine} projects to {coarse}, expected < {num_coarse}")
            }
            ChartError::ProjectionNotSurjective { coarse } => {
                write!(f, "Coarse label {coarse} has no fine label projecting to it")
            }
            ChartError::PriorCountMismatch { sentences, priors } => {
                write!(f, "Got {priors} prior scorers for {sentences} sentences")
            }
            ChartError::Parser { reason } => write!(f, "Parser failed: {reason}"),
            ChartError::WorkerPool { reason } => {
                write!(f, "Failed to build worker pool: {reason}")
            }
        }
    }
}
