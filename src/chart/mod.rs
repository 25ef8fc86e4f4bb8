//! chart — inside-outside posteriors anchored to sentence spans.
//!
//! Purpose
//! -------
//! Given the inside and outside charts an external parser computed for a
//! sentence, compute the posterior log-probability of every lexical, unary
//! and binary item, projected onto a coarser label set, and expose them as
//! an immutable [`AnchoredRuleScorer`](models::AnchoredRuleScorer) that
//! later parsing passes can add in or prune with.
//!
//! Key behaviors
//! -------------
//! - `core`: triangular span addressing, the [`ChartView`](core::ChartView)
//!   read interface, the [`BaseGrammar`](core::BaseGrammar) interface, label
//!   projection and additive [`SpanScorer`](core::SpanScorer)s.
//! - `models`: the posterior builder, the anchored scorer, and batch scoring
//!   over a rayon pool with per-sentence failure isolation.
//!
//! Conventions
//! -----------
//! - Spans are half-open `[begin, end)` over word positions.
//! - Scores are natural-log; `-∞` means impossible or never written.
//! - Charts and grammar use fine labels; stored posteriors use coarse ones.
//! - Charts hold a bottom (pre-unary) and a top (post-unary) layer per span,
//!   so each constituent passes through the unary closure exactly once.
pub mod core;
pub mod errors;
pub mod models;

pub mod prelude {
    pub use super::core::{
        BaseGrammar, ChartView, IdentityScorer, LabelProjection, Layer, ParseCharts, RuleTable,
        SpanScorer, TriangularChart,
    };
    pub use super::errors::{ChartError, ChartResult};
    pub use super::models::{
        AnchoredRuleScorer, BatchOptions, ChartParser, ScoredSentence, SentenceScorer,
        build_anchored_scorer, score_batch, score_batch_with_priors,
    };
}
