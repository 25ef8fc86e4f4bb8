//! Base grammar as seen by the posterior builder.
//!
//! The builder needs three things from a grammar: which labels are
//! preterminals, the binary rules headed by each parent, and the unary
//! closure reachable from each parent. Rule scores are log-space; a rule
//! with a `-∞` score is treated as absent.
use crate::chart::errors::{ChartError, ChartResult};

/// `parent → left right` with a log-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryRule {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

/// `parent →* child` through the unary closure, with a log-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryRule {
    pub child: usize,
    pub score: f64,
}

/// Read-only grammar interface over fine label ids `0..num_labels()`.
pub trait BaseGrammar {
    fn num_labels(&self) -> usize;

    fn is_preterminal(&self, label: usize) -> bool;

    /// Binary rules headed by `parent`; empty for unknown labels.
    fn binary_rules(&self, parent: usize) -> &[BinaryRule];

    /// Precomputed unary closure from `parent`; empty for unknown labels.
    fn unary_closure(&self, parent: usize) -> &[UnaryRule];
}

/// In-memory grammar with rules indexed by parent.
///
/// The unary closure is stored as given. Include the reflexive entry
/// `p →* p` (score 0) where the parsing model has one.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    preterminal: Vec<bool>,
    binary: Vec<Vec<BinaryRule>>,
    unary: Vec<Vec<UnaryRule>>,
}

impl RuleTable {
    pub fn new(num_labels: usize) -> Self {
        Self {
            preterminal: vec![false; num_labels],
            binary: vec![Vec::new(); num_labels],
            unary: vec![Vec::new(); num_labels],
        }
    }

    fn check(&self, label: usize) -> ChartResult<()> {
        if label >= self.preterminal.len() {
            return Err(ChartError::LabelOutOfRange { label, len: self.preterminal.len() });
        }
        Ok(())
    }

    /// # Errors
    /// [`ChartError::LabelOutOfRange`] for an unknown label.
    pub fn mark_preterminal(&mut self, label: usize) -> ChartResult<&mut Self> {
        self.check(label)?;
        self.preterminal[label] = true;
        Ok(self)
    }

    /// # Errors
    /// [`ChartError::LabelOutOfRange`] for an unknown label.
    pub fn add_binary(
        &mut self, parent: usize, left: usize, right: usize, score: f64,
    ) -> ChartResult<&mut Self> {
        self.check(parent)?;
        self.check(left)?;
        self.check(right)?;
        self.binary[parent].push(BinaryRule { left, right, score });
        Ok(self)
    }

    /// # Errors
    /// [`ChartError::LabelOutOfRange`] for an unknown label.
    pub fn add_unary(&mut self, parent: usize, child: usize, score: f64) -> ChartResult<&mut Self> {
        self.check(parent)?;
        self.check(child)?;
        self.unary[parent].push(UnaryRule { child, score });
        Ok(self)
    }

    /// Add `p →* p` with score 0 for every label.
    pub fn with_reflexive_unaries(mut self) -> Self {
        for (parent, rules) in self.unary.iter_mut().enumerate() {
            rules.push(UnaryRule { child: parent, score: 0.0 });
        }
        self
    }
}

impl BaseGrammar for RuleTable {
    fn num_labels(&self) -> usize {
        self.preterminal.len()
    }

    fn is_preterminal(&self, label: usize) -> bool {
        self.preterminal.get(label).copied().unwrap_or(false)
    }

    fn binary_rules(&self, parent: usize) -> &[BinaryRule] {
        self.binary.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    fn unary_closure(&self, parent: usize) -> &[UnaryRule] {
        self.unary.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }
}
