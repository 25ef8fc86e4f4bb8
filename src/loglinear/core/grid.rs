//! Feature grid — context × decision → sorted feature ids.
//!
//! Purpose
//! -------
//! Record, for every context, which decisions are available and which
//! features fire on each `(context, decision)` pair. This is the only
//! structural input to theta computation and to the gradient engine.
//!
//! Key behaviors
//! -------------
//! - [`FeatureSpace::build`] walks an external [`FeatureSource`]: contexts in
//!   source order, each context's decisions, and each pair's features. Keys
//!   are interned into three [`Index`] registries; decision ids are sorted
//!   per context and feature ids are sorted per pair.
//! - A pair for which the source yields no features is *not stored*: the
//!   decision is absent from the context and is never scored.
//! - [`FeatureGridBuilder::insert`] stores a pair verbatim, including an empty
//!   feature list; such a decision is present with a fixed score of zero.
//!
//! Invariants
//! ----------
//! - Every stored feature id is `< num_features`, every decision id
//!   `< num_decisions`, every row has one entry per context id.
//! - Rows iterate decisions in ascending id order, features within a pair in
//!   ascending id order; repeated builds from the same source are identical.
use crate::loglinear::{
    core::{directory::SmallIntMap, index::Index},
    errors::{GridError, GridResult},
};
use std::hash::Hash;

/// External description of the model structure.
///
/// `contexts` must enumerate in a stable order; ids are handed out in the
/// order keys are first seen.
pub trait FeatureSource<C, D, F> {
    /// Every context the model conditions on.
    fn contexts(&self) -> Vec<C>;
    /// Decisions available in `context`.
    fn decisions(&self, context: &C) -> Vec<D>;
    /// Features active on `(context, decision)`.
    fn features(&self, context: &C, decision: &D) -> Vec<F>;
}

/// Sparse table `context id → decision id → sorted feature ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGrid {
    rows: Vec<SmallIntMap<Vec<usize>>>,
    num_decisions: usize,
    num_features: usize,
}

impl FeatureGrid {
    /// Start an empty grid with fixed dimensions; fill it with [`insert`].
    ///
    /// [`insert`]: FeatureGridBuilder::insert
    pub fn builder(
        num_contexts: usize, num_decisions: usize, num_features: usize,
    ) -> FeatureGridBuilder {
        FeatureGridBuilder {
            pending: vec![Vec::new(); num_contexts],
            num_decisions,
            num_features,
        }
    }

    pub fn num_contexts(&self) -> usize {
        self.rows.len()
    }

    pub fn num_decisions(&self) -> usize {
        self.num_decisions
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Decisions present in `context` with their feature ids, ascending by
    /// decision id. Empty for an unknown context.
    pub fn row(&self, context: usize) -> Box<dyn Iterator<Item = (usize, &[usize])> + '_> {
        match self.rows.get(context) {
            Some(row) => Box::new(row.iter().map(|(d, fs)| (d, fs.as_slice()))),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Feature ids of `(context, decision)`, `None` when the decision is
    /// absent from the context.
    pub fn features(&self, context: usize, decision: usize) -> Option<&[usize]> {
        self.rows.get(context)?.get(decision).map(Vec::as_slice)
    }

    /// Whether `decision` is available in `context`.
    pub fn contains(&self, context: usize, decision: usize) -> bool {
        self.features(context, decision).is_some()
    }

    /// Number of decisions present in `context`.
    pub fn row_len(&self, context: usize) -> usize {
        self.rows.get(context).map_or(0, SmallIntMap::len)
    }
}

/// Accumulates `(context, decision, features)` entries before freezing them
/// into a [`FeatureGrid`].
#[derive(Debug, Clone)]
pub struct FeatureGridBuilder {
    pending: Vec<Vec<(usize, Vec<usize>)>>,
    num_decisions: usize,
    num_features: usize,
}

impl FeatureGridBuilder {
    /// Store `(context, decision) → features`. Features are sorted; an empty
    /// list is kept and means "present, scored zero". Inserting the same pair
    /// twice concatenates the feature lists.
    ///
    /// # Errors
    /// Any id outside the builder's dimensions.
    pub fn insert(
        &mut self, context: usize, decision: usize, mut features: Vec<usize>,
    ) -> GridResult<&mut Self> {
        let len = self.pending.len();
        let row =
            self.pending.get_mut(context).ok_or(GridError::ContextOutOfRange { context, len })?;
        if decision >= self.num_decisions {
            return Err(GridError::DecisionOutOfRange { decision, len: self.num_decisions });
        }
        if let Some(&feature) = features.iter().find(|&&f| f >= self.num_features) {
            return Err(GridError::FeatureOutOfRange { feature, len: self.num_features });
        }
        features.sort_unstable();
        row.push((decision, features));
        Ok(self)
    }

    /// Freeze the pending entries, one row per context.
    ///
    /// # Errors
    /// [`GridError::DecisionOutOfRange`] if a pending decision does not fit
    /// the row; [`insert`](Self::insert) already rejects those.
    pub fn build(self) -> GridResult<FeatureGrid> {
        let num_decisions = self.num_decisions;
        let rows = self
            .pending
            .into_iter()
            .map(|pairs| {
                SmallIntMap::from_pairs_with(num_decisions, pairs, |acc: &mut Vec<usize>, more| {
                    acc.extend(more);
                    acc.sort_unstable();
                })
                .map_err(|decision| GridError::DecisionOutOfRange { decision, len: num_decisions })
            })
            .collect::<GridResult<Vec<_>>>()?;
        Ok(FeatureGrid { rows, num_decisions, num_features: self.num_features })
    }
}

/// Feature grid plus the registries that map its ids back to caller keys.
#[derive(Debug, Clone)]
pub struct FeatureSpace<C: Hash + Eq, D: Hash + Eq, F: Hash + Eq> {
    pub contexts: Index<C>,
    pub decisions: Index<D>,
    pub features: Index<F>,
    pub grid: FeatureGrid,
}

impl<C, D, F> FeatureSpace<C, D, F>
where
    C: Hash + Eq + Clone,
    D: Hash + Eq + Clone,
    F: Hash + Eq + Clone,
{
    /// Enumerate `source` and intern every key.
    ///
    /// Contexts are visited in `source.contexts()` order. Within a context,
    /// decisions are interned in source order and then stored by ascending id;
    /// each pair's features are interned in source order and stored sorted.
    ///
    /// # Errors
    /// A [`GridError`] from the grid builder. Ids come from registries sized
    /// to the grid, so this signals a broken registry rather than bad input.
    pub fn build<S: FeatureSource<C, D, F>>(source: &S) -> GridResult<Self> {
        let mut contexts = Index::new();
        let mut decisions = Index::new();
        let mut features = Index::new();
        let mut entries: Vec<(usize, usize, Vec<usize>)> = Vec::new();

        for context in source.contexts() {
            let c = contexts.index(context.clone());
            let mut row: Vec<(usize, D)> = source
                .decisions(&context)
                .into_iter()
                .map(|decision| (decisions.index(decision.clone()), decision))
                .collect();
            row.sort_by_key(|(d, _)| *d);
            row.dedup_by_key(|(d, _)| *d);
            for (d, decision) in row {
                let fs: Vec<usize> = source
                    .features(&context, &decision)
                    .into_iter()
                    .map(|feature| features.index(feature))
                    .collect();
                if !fs.is_empty() {
                    entries.push((c, d, fs));
                }
            }
        }

        let mut builder = FeatureGrid::builder(contexts.len(), decisions.len(), features.len());
        for (c, d, fs) in entries {
            builder.insert(c, d, fs)?;
        }
        Ok(Self { contexts, decisions, features, grid: builder.build()? })
    }

    pub fn context_key(&self, id: usize) -> Option<&C> {
        self.contexts.get(id)
    }

    pub fn decision_key(&self, id: usize) -> Option<&D> {
        self.decisions.get(id)
    }

    pub fn feature_key(&self, id: usize) -> Option<&F> {
        self.features.get(id)
    }

    /// Weight of `feature` in `weights`, `None` for an unknown feature.
    pub fn weight_of(&self, feature: &F, weights: &ndarray::Array1<f64>) -> Option<f64> {
        self.features.find(feature).and_then(|id| weights.get(id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two contexts; "NP" offers three decisions, one of them featureless.
    struct ToySource;

    impl FeatureSource<&'static str, &'static str, String> for ToySource {
        fn contexts(&self) -> Vec<&'static str> {
            vec!["S", "NP"]
        }

        fn decisions(&self, context: &&'static str) -> Vec<&'static str> {
            match *context {
                "S" => vec!["NP VP"],
                _ => vec!["DT NN", "NNP", "PRP"],
            }
        }

        fn features(&self, context: &&'static str, decision: &&'static str) -> Vec<String> {
            if *decision == "PRP" {
                return Vec::new();
            }
            vec![format!("rule={context}->{decision}"), format!("parent={context}")]
        }
    }

    #[test]
    // Purpose
    // -------
    // Building from a source interns keys in first-seen order and drops
    // featureless pairs.
    //
    // Given
    // -----
    // - `ToySource`, where ("NP", "PRP") has no features.
    //
    // Expect
    // ------
    // - Decision "PRP" is registered but absent from the grid row.
    // - Features within each pair are sorted ascending.
    fn build_interns_keys_and_skips_featureless_pairs() {
        // Act
        let space = FeatureSpace::build(&ToySource).expect("registry ids fit the grid");

        // Assert
        assert_eq!(space.contexts.len(), 2);
        assert_eq!(space.decisions.len(), 4);
        let np = space.contexts.find(&"NP").expect("NP registered");
        let prp = space.decisions.find(&"PRP").expect("PRP registered");
        assert!(!space.grid.contains(np, prp));
        assert_eq!(space.grid.row_len(np), 2);
        for (_, features) in space.grid.row(np) {
            assert!(features.windows(2).all(|w| w[0] <= w[1]));
        }
        assert_eq!(space.feature_key(0).map(String::as_str), Some("rule=S->NP VP"));
    }

    #[test]
    // Purpose
    // -------
    // Two builds from the same source produce identical grids.
    fn repeated_builds_are_identical() {
        let first = FeatureSpace::build(&ToySource).expect("valid");
        let second = FeatureSpace::build(&ToySource).expect("valid");
        assert_eq!(first.grid, second.grid);
        assert_eq!(first.features, second.features);
    }

    #[test]
    // Purpose
    // -------
    // Direct insertion keeps explicit empty feature lists and validates ids.
    fn insert_keeps_empty_lists_and_rejects_bad_ids() {
        // Arrange
        let mut builder = FeatureGrid::builder(1, 2, 3);

        // Act
        builder.insert(0, 0, vec![2, 0]).expect("valid");
        builder.insert(0, 1, Vec::new()).expect("valid");
        let bad_feature = builder.insert(0, 0, vec![3]).map(|_| ());
        let bad_context = builder.insert(1, 0, vec![]).map(|_| ());
        let grid = builder.build().expect("inserted ids were validated");

        // Assert
        assert_eq!(grid.features(0, 0), Some(&[0, 2][..]));
        assert_eq!(grid.features(0, 1), Some(&[][..]));
        assert_eq!(bad_feature, Err(GridError::FeatureOutOfRange { feature: 3, len: 3 }));
        assert_eq!(bad_context, Err(GridError::ContextOutOfRange { context: 1, len: 1 }));
    }
}
