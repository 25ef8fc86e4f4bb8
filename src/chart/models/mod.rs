//! chart::models — posterior builder, anchored scorer and batch scoring.
pub mod anchored;
pub mod batch;
pub mod posterior;

// ---- Re-exports ----
pub use self::anchored::AnchoredRuleScorer;
pub use self::batch::{
    BatchOptions, ChartParser, ScoredSentence, SentenceScorer, score_batch,
    score_batch_with_priors,
};
pub use self::posterior::build_anchored_scorer;
