//! Posterior builder — inside/outside charts to an [`AnchoredRuleScorer`].
//!
//! Purpose
//! -------
//! Turn the inside and outside charts of one sentence into coarse-label
//! posterior log-scores for every lexical, unary and binary item.
//!
//! Key behaviors
//! -------------
//! With `Z` the sentence log-probability, `ext` the additive scorer the
//! charts were computed under, and `in↓/in↑`, `out↓/out↑` the bottom and top
//! layers of the charts:
//! - Lexical, for each position `i` and each preterminal `l` with finite
//!   bottom inside over `[i, i+1)`:
//!   `in↓(l) + ext.lexical(i, i+1, l) + out↓(l) − Z`.
//! - Unary, for each span and each parent `p` with finite `out↑`, for each
//!   `(c, s)` in the unary closure of `p`:
//!   `s + in↓(c) + out↑(p) + ext.unary(b, e, p, c) − Z`, where `in↓(c)`
//!   also takes `ext.lexical` on unit spans.
//! - Binary, for each span of length ≥ 2, each parent `p` with finite
//!   `out↓`, each split `k` and each rule `p → l r` with finite score `s`:
//!   `in↑(b, k, l) + in↑(k, e, r) + out↓(p) + s + ext.binary(..) − Z`.
//!
//! Each constituent passes through exactly one closure entry, so the unary
//! posteriors of a span sum to the probability that the span is a
//! constituent, and so do its binary posteriors for spans of length ≥ 2.
//!
//! Contributions are projected to coarse labels and accumulated with
//! `log_add`, since several fine labels can share one coarse label. A
//! contribution of `-∞` is dropped before anything is allocated. Spans are
//! visited shortest first.
//!
//! Invariants & assumptions
//! ------------------------
//! - Grammar, charts and projection agree on the fine label count.
//! - Charts follow the unit-span contract of
//!   [`charts`](crate::chart::core::charts): bottom inside scores of unit
//!   spans leave out `ext.lexical`.
//! - `Z` must be finite; otherwise the sentence is reported unparsable.
//! - The charts are read-only inputs; building is a pure function of its
//!   arguments.
use crate::{
    chart::{
        core::{
            charts::{ChartView, Layer, ParseCharts},
            grammar::BaseGrammar,
            projection::LabelProjection,
            scorer::SpanScorer,
            triangle::{spans_by_length, triangular_index},
        },
        errors::{ChartError, ChartResult},
        models::anchored::{AnchoredRuleScorer, BinaryCells, UnaryCells},
    },
    optimization::numerical_stability::log_add,
};
use log::trace;
use ndarray::Array2;

/// Build the posterior scorer of one sentence.
///
/// # Arguments
/// - `charts`: inside/outside charts and the sentence log-probability.
/// - `grammar`: preterminals, binary rules and unary closure over fine labels.
/// - `projection`: fine → coarse label map used for the stored scores.
/// - `external`: the additive scorer the charts were computed under
///   ([`IdentityScorer`](crate::chart::core::scorer::IdentityScorer) if none).
///
/// # Errors
/// - [`ChartError::UnparsableSentence`] when `charts.log_prob` is not finite;
///   it carries `charts.tokens`.
/// - [`ChartError::LabelCountMismatch`] when grammar, charts and projection
///   disagree on the number of fine labels.
pub fn build_anchored_scorer<C, G, S>(
    charts: &ParseCharts<C>, grammar: &G, projection: &LabelProjection, external: &S,
) -> ChartResult<AnchoredRuleScorer>
where
    C: ChartView,
    G: BaseGrammar + ?Sized,
    S: SpanScorer + ?Sized,
{
    let len = charts.len();
    let log_z = charts.log_prob;
    if !log_z.is_finite() {
        let tokens = charts.tokens.clone();
        return Err(ChartError::UnparsableSentence { tokens, log_prob: log_z });
    }
    if grammar.num_labels() != charts.num_labels() || projection.num_fine() != charts.num_labels()
    {
        return Err(ChartError::LabelCountMismatch {
            grammar: grammar.num_labels(),
            charts: charts.num_labels(),
            projection: projection.num_fine(),
        });
    }

    let mut acc = Accumulator::new(len, projection);
    let (inside, outside) = (&charts.inside, &charts.outside);

    for i in 0..len {
        for (label, in_l) in inside.entered(Layer::Bottom, i, i + 1) {
            if !grammar.is_preterminal(label) {
                continue;
            }
            let out_l = outside.score(Layer::Bottom, i, i + 1, label);
            acc.lexical(i, label, in_l + external.lexical_score(i, i + 1, label) + out_l - log_z);
        }
    }

    for (begin, end) in spans_by_length(len, 1) {
        let span = triangular_index(begin, end);
        for (parent, out_p) in outside.entered(Layer::Top, begin, end) {
            for rule in grammar.unary_closure(parent) {
                let score = rule.score
                    + bottom_inside(inside, external, begin, end, rule.child)
                    + out_p
                    + external.unary_score(begin, end, parent, rule.child)
                    - log_z;
                acc.unary(span, parent, rule.child, score);
            }
        }
        if end - begin < 2 {
            continue;
        }
        for (parent, out_p) in outside.entered(Layer::Bottom, begin, end) {
            for split in begin + 1..end {
                for rule in grammar.binary_rules(parent) {
                    if !rule.score.is_finite() {
                        continue;
                    }
                    let in_left = inside.score(Layer::Top, begin, split, rule.left);
                    if in_left == f64::NEG_INFINITY {
                        continue;
                    }
                    let score = in_left
                        + inside.score(Layer::Top, split, end, rule.right)
                        + out_p
                        + rule.score
                        + external.binary_score(begin, split, end, parent, rule.left, rule.right)
                        - log_z;
                    acc.binary(span, split, parent, rule.left, rule.right, score);
                }
            }
        }
    }

    let scorer = acc.finish();
    let (unary_cells, binary_cells) = scorer.allocated_cells();
    trace!(
        "Anchored scorer over {len} words: log Z {log_z:.4}, {} unary and {} binary cells",
        unary_cells,
        binary_cells
    );
    Ok(scorer)
}

/// Bottom inside score of `label`, with the external lexical term on unit
/// spans.
fn bottom_inside<C, S>(inside: &C, external: &S, begin: usize, end: usize, label: usize) -> f64
where
    C: ChartView,
    S: SpanScorer + ?Sized,
{
    let score = inside.score(Layer::Bottom, begin, end, label);
    if end - begin == 1 { score + external.lexical_score(begin, end, label) } else { score }
}

/// Mutable tables filled during one build.
struct Accumulator<'p> {
    len: usize,
    projection: &'p LabelProjection,
    lexical: Array2<f64>,
    unary: UnaryCells,
    binary: BinaryCells,
}

impl<'p> Accumulator<'p> {
    fn new(len: usize, projection: &'p LabelProjection) -> Self {
        Self {
            len,
            projection,
            lexical: Array2::from_elem((len, projection.num_coarse()), f64::NEG_INFINITY),
            unary: UnaryCells::new(),
            binary: BinaryCells::new(),
        }
    }

    fn coarse(&self, fine: usize) -> Option<usize> {
        self.projection.project(fine)
    }

    fn lexical(&mut self, position: usize, label: usize, score: f64) {
        if !score.is_finite() {
            return;
        }
        if let Some(cell) = self.coarse(label).and_then(|l| self.lexical.get_mut((position, l))) {
            *cell = log_add(*cell, score);
        }
    }

    fn unary(&mut self, span: usize, parent: usize, child: usize, score: f64) {
        if !score.is_finite() {
            return;
        }
        let (Some(p), Some(c)) = (self.coarse(parent), self.coarse(child)) else {
            return;
        };
        let cell = self.unary.entry((span, p)).or_default().entry(c).or_insert(f64::NEG_INFINITY);
        *cell = log_add(*cell, score);
    }

    fn binary(
        &mut self, span: usize, split: usize, parent: usize, left: usize, right: usize, score: f64,
    ) {
        if !score.is_finite() {
            return;
        }
        let (Some(p), Some(l), Some(r)) =
            (self.coarse(parent), self.coarse(left), self.coarse(right))
        else {
            return;
        };
        let cell = self
            .binary
            .entry((span, split, p))
            .or_default()
            .entry((l, r))
            .or_insert(f64::NEG_INFINITY);
        *cell = log_add(*cell, score);
    }

    fn finish(self) -> AnchoredRuleScorer {
        AnchoredRuleScorer::from_parts(
            self.len,
            self.projection.num_coarse(),
            self.lexical,
            self.unary,
            self.binary,
        )
    }
}
