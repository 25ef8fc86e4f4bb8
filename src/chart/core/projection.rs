//! Fine → coarse label projection.
use crate::chart::errors::{ChartError, ChartResult};

/// Surjection from fine label ids onto `0..num_coarse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelProjection {
    map: Vec<usize>,
    num_coarse: usize,
}

impl LabelProjection {
    /// `map[fine] = coarse`.
    ///
    /// # Errors
    /// - [`ChartError::InvalidProjection`] for a coarse id `>= num_coarse`.
    /// - [`ChartError::ProjectionNotSurjective`] for a coarse id nothing maps to.
    pub fn new(map: Vec<usize>, num_coarse: usize) -> ChartResult<Self> {
        let mut hit = vec![false; num_coarse];
        for (fine, &coarse) in map.iter().enumerate() {
            match hit.get_mut(coarse) {
                Some(slot) => *slot = true,
                None => return Err(ChartError::InvalidProjection { fine, coarse, num_coarse }),
            }
        }
        if let Some(coarse) = hit.iter().position(|h| !h) {
            return Err(ChartError::ProjectionNotSurjective { coarse });
        }
        Ok(Self { map, num_coarse })
    }

    /// Every label projects to itself.
    pub fn identity(num_labels: usize) -> Self {
        Self { map: (0..num_labels).collect(), num_coarse: num_labels }
    }

    #[inline]
    pub fn project(&self, fine: usize) -> Option<usize> {
        self.map.get(fine).copied()
    }

    pub fn num_fine(&self) -> usize {
        self.map.len()
    }

    pub fn num_coarse(&self) -> usize {
        self.num_coarse
    }
}
