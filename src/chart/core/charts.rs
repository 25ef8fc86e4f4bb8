//! Inside/outside charts as consumed by the posterior builder.
//!
//! Every span carries two label layers. [`Layer::Bottom`] holds a label's
//! score before unary rules apply (built from a binary rule, or from the
//! tag of a word on unit spans); [`Layer::Top`] holds it after one
//! application of the unary closure. Inside scores flow bottom → top,
//! outside scores top → bottom.
//!
//! Unit-span contract: a bottom inside score is the grammar's own tag score
//! and leaves out the external scorer's lexical term. Top inside scores,
//! and every outside score, include all external terms.
//!
//! The builder only reads charts, through [`ChartView`]. [`TriangularChart`]
//! is the in-memory implementation: dense label vectors per span and layer,
//! `-∞` for labels that never entered.
use crate::chart::{
    core::triangle::TriangularArray,
    errors::{ChartError, ChartResult},
};

/// Position of a score relative to the unary closure of its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Before unaries.
    Bottom,
    /// After unaries.
    Top,
}

/// Read-only access to one DP table over a sentence.
pub trait ChartView {
    /// Number of words in the sentence.
    fn len(&self) -> usize;

    /// Number of fine labels per span.
    fn num_labels(&self) -> usize;

    /// Log-score of `label` over `[begin, end)` in `layer`; `-∞` when absent
    /// or out of range.
    fn score(&self, layer: Layer, begin: usize, end: usize, label: usize) -> f64;

    /// Labels with a finite score over `[begin, end)` in `layer`, ascending.
    fn entered(&self, layer: Layer, begin: usize, end: usize) -> Vec<(usize, f64)> {
        (0..self.num_labels())
            .map(|label| (label, self.score(layer, begin, end, label)))
            .filter(|(_, score)| score.is_finite())
            .collect()
    }
}

/// Dense per-span label scores in triangular layout, one table per layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularChart {
    num_labels: usize,
    bottom: TriangularArray<Vec<f64>>,
    top: TriangularArray<Vec<f64>>,
}

impl TriangularChart {
    /// Chart over `len` words with every score `-∞`.
    pub fn new(len: usize, num_labels: usize) -> Self {
        let empty = TriangularArray::new(len, vec![f64::NEG_INFINITY; num_labels]);
        Self { num_labels, bottom: empty.clone(), top: empty }
    }

    fn layer(&self, layer: Layer) -> &TriangularArray<Vec<f64>> {
        match layer {
            Layer::Bottom => &self.bottom,
            Layer::Top => &self.top,
        }
    }

    /// Overwrite one cell.
    ///
    /// # Errors
    /// [`ChartError::SpanOutOfRange`] or [`ChartError::LabelOutOfRange`].
    pub fn set(
        &mut self, layer: Layer, begin: usize, end: usize, label: usize, score: f64,
    ) -> ChartResult<()> {
        let len = self.num_labels;
        let cells = match layer {
            Layer::Bottom => &mut self.bottom,
            Layer::Top => &mut self.top,
        };
        let slot = cells
            .try_get_mut(begin, end)?
            .get_mut(label)
            .ok_or(ChartError::LabelOutOfRange { label, len })?;
        *slot = score;
        Ok(())
    }
}

impl ChartView for TriangularChart {
    fn len(&self) -> usize {
        self.bottom.len()
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn score(&self, layer: Layer, begin: usize, end: usize, label: usize) -> f64 {
        self.layer(layer)
            .get(begin, end)
            .and_then(|row| row.get(label))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }
}

/// Inside and outside charts of one sentence plus its log-probability.
///
/// `tokens` renders the sentence for diagnostics; it is empty unless set
/// with [`ParseCharts::with_tokens`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParseCharts<C = TriangularChart> {
    pub inside: C,
    pub outside: C,
    pub log_prob: f64,
    pub tokens: Vec<String>,
}

impl<C: ChartView> ParseCharts<C> {
    /// Pair two charts with a known sentence log-probability.
    ///
    /// A non-finite `log_prob` is accepted here and rejected when a scorer is
    /// built from the charts.
    ///
    /// # Errors
    /// [`ChartError::ChartShapeMismatch`] when the charts disagree on length
    /// or label count.
    pub fn new(inside: C, outside: C, log_prob: f64) -> ChartResult<Self> {
        if inside.len() != outside.len() || inside.num_labels() != outside.num_labels() {
            return Err(ChartError::ChartShapeMismatch {
                inside: (inside.len(), inside.num_labels()),
                outside: (outside.len(), outside.num_labels()),
            });
        }
        Ok(Self { inside, outside, log_prob, tokens: Vec::new() })
    }

    /// Attach the sentence's tokens, replacing any already attached.
    pub fn with_tokens<I, T>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.tokens = tokens.into_iter().map(|token| token.to_string()).collect();
        self
    }

    /// Use the root's top-layer inside score over the whole sentence as
    /// log-probability.
    ///
    /// # Errors
    /// Same as [`ParseCharts::new`], plus [`ChartError::LabelOutOfRange`] for
    /// an unknown root.
    pub fn from_root(inside: C, outside: C, root: usize) -> ChartResult<Self> {
        if root >= inside.num_labels() {
            return Err(ChartError::LabelOutOfRange { label: root, len: inside.num_labels() });
        }
        let log_prob = inside.score(Layer::Top, 0, inside.len(), root);
        Self::new(inside, outside, log_prob)
    }

    pub fn len(&self) -> usize {
        self.inside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_labels(&self) -> usize {
        self.inside.num_labels()
    }
}
