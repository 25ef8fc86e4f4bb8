//! Expected counts — the E-step's sufficient statistics.
//!
//! A non-negative, possibly fractional, `contexts × decisions` table. Each
//! row is a [`SmallIntMap`], so a row touched by few decisions is stored
//! sparsely and a busy row densely; the objective reads both through the same
//! ascending-key iteration and gets bit-identical results either way.
//!
//! Row totals `T(c) = Σ_d e(c, d)` are computed once at construction.
use crate::loglinear::{
    core::directory::SmallIntMap,
    errors::{GridError, GridResult},
};
use ndarray::Array2;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedCounts {
    rows: Vec<SmallIntMap<f64>>,
    totals: Vec<f64>,
    num_decisions: usize,
}

impl ExpectedCounts {
    /// Build from `(context, decision, count)` triples; repeated cells are
    /// summed.
    ///
    /// # Errors
    /// - [`GridError::ContextOutOfRange`] / [`GridError::DecisionOutOfRange`]
    ///   for ids outside `num_contexts × num_decisions`.
    /// - [`GridError::InvalidCount`] for negative or non-finite counts.
    pub fn from_sparse<I>(num_contexts: usize, num_decisions: usize, triples: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut pending: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_contexts];
        for (context, decision, value) in triples {
            check_count(context, decision, value)?;
            let row = pending
                .get_mut(context)
                .ok_or(GridError::ContextOutOfRange { context, len: num_contexts })?;
            row.push((decision, value));
        }
        let rows = pending
            .into_iter()
            .map(|pairs| {
                SmallIntMap::from_pairs_summed(num_decisions, pairs).map_err(|decision| {
                    GridError::DecisionOutOfRange { decision, len: num_decisions }
                })
            })
            .collect::<GridResult<Vec<_>>>()?;
        Ok(Self::from_rows(rows, num_decisions))
    }

    /// Build from a dense table; zero cells are not stored.
    ///
    /// # Errors
    /// [`GridError::InvalidCount`] for negative or non-finite cells.
    pub fn from_dense(table: &Array2<f64>) -> GridResult<Self> {
        let num_decisions = table.ncols();
        let mut rows = Vec::with_capacity(table.nrows());
        for (context, row) in table.outer_iter().enumerate() {
            let mut pairs = Vec::new();
            for (decision, &value) in row.iter().enumerate() {
                check_count(context, decision, value)?;
                if value != 0.0 {
                    pairs.push((decision, value));
                }
            }
            // Keys come from `enumerate` over `num_decisions` columns.
            let map = SmallIntMap::from_pairs_summed(num_decisions, pairs)
                .map_err(|decision| GridError::DecisionOutOfRange {
                    decision,
                    len: num_decisions,
                })?;
            rows.push(map);
        }
        Ok(Self::from_rows(rows, num_decisions))
    }

    fn from_rows(rows: Vec<SmallIntMap<f64>>, num_decisions: usize) -> Self {
        let totals = rows.iter().map(SmallIntMap::sum).collect();
        Self { rows, totals, num_decisions }
    }

    pub fn num_contexts(&self) -> usize {
        self.rows.len()
    }

    pub fn num_decisions(&self) -> usize {
        self.num_decisions
    }

    /// `e(context, decision)`; zero when never recorded.
    pub fn get(&self, context: usize, decision: usize) -> f64 {
        self.rows.get(context).and_then(|row| row.get(decision)).copied().unwrap_or(0.0)
    }

    /// `T(context) = Σ_d e(context, d)`.
    pub fn total(&self, context: usize) -> f64 {
        self.totals.get(context).copied().unwrap_or(0.0)
    }

    /// Non-zero cells of `context` in ascending decision order.
    pub fn row(&self, context: usize) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        match self.rows.get(context) {
            Some(row) => Box::new(row.iter().map(|(d, v)| (d, *v))),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Total mass over the whole table.
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().sum()
    }
}

fn check_count(context: usize, decision: usize, value: f64) -> GridResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GridError::InvalidCount { context, decision, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Sparse and dense construction describe the same table.
    //
    // Given
    // -----
    // - A 2×3 table given once as triples (with a repeated cell) and once as
    //   a dense array.
    //
    // Expect
    // ------
    // - Equal cells, totals and row iteration.
    fn sparse_and_dense_construction_agree() {
        // Arrange
        let dense = array![[1.0, 0.0, 2.5], [0.0, 0.0, 0.0]];
        let triples = [(0, 2, 2.0), (0, 0, 1.0), (0, 2, 0.5)];

        // Act
        let from_dense = ExpectedCounts::from_dense(&dense).expect("valid");
        let from_sparse = ExpectedCounts::from_sparse(2, 3, triples).expect("valid");

        // Assert
        assert_eq!(from_dense.get(0, 2), 2.5);
        assert_eq!(from_sparse.get(0, 2), 2.5);
        assert_eq!(from_dense.total(0), 3.5);
        assert_eq!(from_sparse.total(0), 3.5);
        assert_eq!(from_sparse.total(1), 0.0);
        let a: Vec<_> = from_dense.row(0).collect();
        let b: Vec<_> = from_sparse.row(0).collect();
        assert_eq!(a, b);
        assert_eq!(from_sparse.grand_total(), 3.5);
    }

    #[test]
    // Purpose
    // -------
    // Invalid cells are rejected with their coordinates.
    fn invalid_counts_are_rejected() {
        let neg = ExpectedCounts::from_sparse(1, 2, [(0, 1, -0.5)]).unwrap_err();
        assert_eq!(neg, GridError::InvalidCount { context: 0, decision: 1, value: -0.5 });

        let nan = ExpectedCounts::from_dense(&array![[0.0, f64::NAN]]).unwrap_err();
        assert!(matches!(nan, GridError::InvalidCount { context: 0, decision: 1, .. }));

        let ctx = ExpectedCounts::from_sparse(1, 2, [(3, 0, 1.0)]).unwrap_err();
        assert_eq!(ctx, GridError::ContextOutOfRange { context: 3, len: 1 });

        let dec = ExpectedCounts::from_sparse(1, 2, [(0, 2, 1.0)]).unwrap_err();
        assert_eq!(dec, GridError::DecisionOutOfRange { decision: 2, len: 2 });
    }
}
