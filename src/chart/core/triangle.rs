//! Triangular span addressing.
//!
//! A sentence of `n` words has `(n + 1)(n + 2) / 2` spans `[begin, end)` with
//! `0 <= begin <= end <= n`. Span `(begin, end)` lives at
//! `end · (end + 1) / 2 + begin`, so all spans ending at `end` are contiguous
//! and the layout never wastes the lower half of a square table.
use crate::chart::errors::{ChartError, ChartResult};

/// Flat index of span `[begin, end)`. Caller guarantees `begin <= end`.
#[inline]
pub fn triangular_index(begin: usize, end: usize) -> usize {
    end * (end + 1) / 2 + begin
}

/// Number of spans over `len` words, including empty ones.
#[inline]
pub fn num_spans(len: usize) -> usize {
    (len + 1) * (len + 2) / 2
}

/// Spans `[begin, end)` with `end - begin >= min_len`, ordered by increasing
/// length and then by `begin`.
pub fn spans_by_length(len: usize, min_len: usize) -> impl Iterator<Item = (usize, usize)> {
    (min_len.max(1)..=len)
        .flat_map(move |width| (0..=len - width).map(move |begin| (begin, begin + width)))
}

/// One value per span of a sentence, stored in triangular order.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularArray<T> {
    len: usize,
    cells: Vec<T>,
}

impl<T: Clone> TriangularArray<T> {
    /// Every span initialised to `fill`.
    pub fn new(len: usize, fill: T) -> Self {
        Self { len, cells: vec![fill; num_spans(len)] }
    }
}

impl<T> TriangularArray<T> {
    /// Number of words covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn offset(&self, begin: usize, end: usize) -> Option<usize> {
        (begin <= end && end <= self.len).then(|| triangular_index(begin, end))
    }

    pub fn get(&self, begin: usize, end: usize) -> Option<&T> {
        self.offset(begin, end).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, begin: usize, end: usize) -> Option<&mut T> {
        self.offset(begin, end).map(|i| &mut self.cells[i])
    }

    /// Mutable access with a span check.
    ///
    /// # Errors
    /// [`ChartError::SpanOutOfRange`] unless `begin <= end <= len`.
    pub fn try_get_mut(&mut self, begin: usize, end: usize) -> ChartResult<&mut T> {
        let len = self.len;
        self.get_mut(begin, end).ok_or(ChartError::SpanOutOfRange { begin, end, len })
    }
}
