//! AnchoredRuleScorer — per-sentence posterior log-scores.
//!
//! Purpose
//! -------
//! Hold the coarse-label posteriors of one sentence, as produced by
//! [`build_anchored_scorer`](super::posterior::build_anchored_scorer), and
//! answer point queries against them.
//!
//! Key behaviors
//! -------------
//! - Lexical posteriors are a dense `len × num_labels` table; unary and
//!   binary posteriors are sparse maps keyed by `(span, parent)` and
//!   `(span, split, parent)`, holding only combinations that received a
//!   finite contribution.
//! - Every query returns `-∞` for a combination never written, including
//!   out-of-range spans, out-of-range labels and non-unit lexical spans.
//! - Implements [`SpanScorer`], so one pass's posteriors can be added into
//!   the next pass.
//!
//! Invariants & assumptions
//! ------------------------
//! - Immutable after construction; `Send + Sync` for concurrent readers.
//! - Label ids are coarse ids.
use crate::{
    chart::core::{scorer::SpanScorer, triangle::triangular_index},
    optimization::numerical_stability::log_sum_exp_iter,
};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

pub(crate) type UnaryCells = HashMap<(usize, usize), BTreeMap<usize, f64>>;
pub(crate) type BinaryCells = HashMap<(usize, usize, usize), BTreeMap<(usize, usize), f64>>;

/// Posterior log-scores of one sentence over coarse labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredRuleScorer {
    len: usize,
    num_labels: usize,
    lexical: Array2<f64>,
    unary: UnaryCells,
    binary: BinaryCells,
}

impl AnchoredRuleScorer {
    pub(crate) fn from_parts(
        len: usize, num_labels: usize, lexical: Array2<f64>, unary: UnaryCells,
        binary: BinaryCells,
    ) -> Self {
        Self { len, num_labels, lexical, unary, binary }
    }

    /// Number of words in the sentence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of coarse labels.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn span(&self, begin: usize, end: usize) -> Option<usize> {
        (begin < end && end <= self.len).then(|| triangular_index(begin, end))
    }

    /// Posterior of `label` preterminal over `[begin, begin + 1)`.
    pub fn lexical_score(&self, begin: usize, end: usize, label: usize) -> f64 {
        if end.checked_sub(begin) != Some(1) {
            return f64::NEG_INFINITY;
        }
        self.lexical.get((begin, label)).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Posterior of the unary chain `parent →* child` over `[begin, end)`.
    pub fn unary_score(&self, begin: usize, end: usize, parent: usize, child: usize) -> f64 {
        self.span(begin, end)
            .and_then(|span| self.unary.get(&(span, parent)))
            .and_then(|children| children.get(&child))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Posterior of `parent → left right` over `[begin, end)` split at `split`.
    pub fn binary_score(
        &self, begin: usize, split: usize, end: usize, parent: usize, left: usize, right: usize,
    ) -> f64 {
        if !(begin < split && split < end) {
            return f64::NEG_INFINITY;
        }
        self.span(begin, end)
            .and_then(|span| self.binary.get(&(span, split, parent)))
            .and_then(|children| children.get(&(left, right)))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Log-marginal of `label` over `[begin, end)`: the log-sum of every unary
    /// posterior headed by `label` on that span.
    pub fn span_posterior(&self, begin: usize, end: usize, label: usize) -> f64 {
        self.span(begin, end)
            .and_then(|span| self.unary.get(&(span, label)))
            .map_or(f64::NEG_INFINITY, |children| log_sum_exp_iter(children.values().copied()))
    }

    /// `true` when the span marginal of `label` is below `threshold` (log space).
    pub fn is_pruned(&self, begin: usize, end: usize, label: usize, threshold: f64) -> bool {
        self.span_posterior(begin, end, label) < threshold
    }

    /// Number of sparse unary and binary cells actually allocated.
    pub fn allocated_cells(&self) -> (usize, usize) {
        (self.unary.len(), self.binary.len())
    }
}

impl SpanScorer for AnchoredRuleScorer {
    fn lexical_score(&self, begin: usize, end: usize, label: usize) -> f64 {
        AnchoredRuleScorer::lexical_score(self, begin, end, label)
    }

    fn unary_score(&self, begin: usize, end: usize, parent: usize, child: usize) -> f64 {
        AnchoredRuleScorer::unary_score(self, begin, end, parent, child)
    }

    fn binary_score(
        &self, begin: usize, split: usize, end: usize, parent: usize, left: usize, right: usize,
    ) -> f64 {
        AnchoredRuleScorer::binary_score(self, begin, split, end, parent, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnchoredRuleScorer {
        let mut lexical = Array2::from_elem((2, 3), f64::NEG_INFINITY);
        lexical[[0, 1]] = -0.1;
        let mut unary = UnaryCells::new();
        let span = triangular_index(0, 2);
        unary.entry((span, 0)).or_default().insert(0, (0.25f64).ln());
        unary.entry((span, 0)).or_default().insert(2, (0.5f64).ln());
        let mut binary = BinaryCells::new();
        binary.entry((span, 1, 0)).or_default().insert((1, 2), -0.2);
        AnchoredRuleScorer::from_parts(2, 3, lexical, unary, binary)
    }

    #[test]
    // Purpose
    // -------
    // Written cells are returned; everything else is `-∞`.
    fn unwritten_combinations_are_negative_infinity() {
        let s = sample();
        assert_eq!(s.lexical_score(0, 1, 1), -0.1);
        assert_eq!(s.lexical_score(0, 1, 0), f64::NEG_INFINITY);
        assert_eq!(s.lexical_score(0, 2, 1), f64::NEG_INFINITY);
        assert_eq!(s.lexical_score(5, 6, 1), f64::NEG_INFINITY);
        assert_eq!(s.unary_score(0, 2, 0, 2), (0.5f64).ln());
        assert_eq!(s.unary_score(0, 2, 0, 1), f64::NEG_INFINITY);
        assert_eq!(s.unary_score(1, 2, 0, 2), f64::NEG_INFINITY);
        assert_eq!(s.binary_score(0, 1, 2, 0, 1, 2), -0.2);
        assert_eq!(s.binary_score(0, 1, 2, 0, 2, 1), f64::NEG_INFINITY);
        assert_eq!(s.binary_score(0, 0, 2, 0, 1, 2), f64::NEG_INFINITY);
        assert_eq!(s.binary_score(0, 1, 3, 0, 1, 2), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Span marginals sum unary posteriors; pruning compares against them.
    fn span_posterior_and_pruning() {
        let s = sample();
        assert!((s.span_posterior(0, 2, 0) - (0.75f64).ln()).abs() < 1e-12);
        assert_eq!(s.span_posterior(0, 2, 1), f64::NEG_INFINITY);
        assert!(!s.is_pruned(0, 2, 0, (0.5f64).ln()));
        assert!(s.is_pruned(0, 2, 0, (0.9f64).ln()));
        assert!(s.is_pruned(0, 1, 2, -100.0));
    }

    #[test]
    // Purpose
    // -------
    // Extreme positions read as `-∞` instead of overflowing.
    fn extreme_positions_are_negative_infinity() {
        let s = sample();
        assert_eq!(s.lexical_score(usize::MAX, usize::MAX, 1), f64::NEG_INFINITY);
        assert_eq!(s.lexical_score(usize::MAX, 0, 1), f64::NEG_INFINITY);
        assert_eq!(s.unary_score(usize::MAX, usize::MAX, 0, 0), f64::NEG_INFINITY);
        assert_eq!(s.binary_score(0, usize::MAX - 1, usize::MAX, 0, 1, 2), f64::NEG_INFINITY);
        assert_eq!(s.span_posterior(1, usize::MAX, 0), f64::NEG_INFINITY);
    }

    #[test]
    fn scorer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnchoredRuleScorer>();
    }
}
