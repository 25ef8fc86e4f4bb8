//! Additive span scorers.
//!
//! A [`SpanScorer`] adds a log-space bias to every lexical, unary and binary
//! item of a parse. Parsers and the posterior builder both consult it, so
//! the posteriors of one pass can steer (or prune) the next.

/// Log-space additive scores anchored to spans of one sentence.
///
/// Returning `-∞` forbids an item; returning `0` leaves it unchanged.
pub trait SpanScorer {
    fn lexical_score(&self, begin: usize, end: usize, label: usize) -> f64;

    fn unary_score(&self, begin: usize, end: usize, parent: usize, child: usize) -> f64;

    fn binary_score(
        &self, begin: usize, split: usize, end: usize, parent: usize, left: usize, right: usize,
    ) -> f64;
}

/// Scores every item `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityScorer;

impl SpanScorer for IdentityScorer {
    fn lexical_score(&self, _: usize, _: usize, _: usize) -> f64 {
        0.0
    }

    fn unary_score(&self, _: usize, _: usize, _: usize, _: usize) -> f64 {
        0.0
    }

    fn binary_score(&self, _: usize, _: usize, _: usize, _: usize, _: usize, _: usize) -> f64 {
        0.0
    }
}

impl<S: SpanScorer + ?Sized> SpanScorer for &S {
    fn lexical_score(&self, begin: usize, end: usize, label: usize) -> f64 {
        (**self).lexical_score(begin, end, label)
    }

    fn unary_score(&self, begin: usize, end: usize, parent: usize, child: usize) -> f64 {
        (**self).unary_score(begin, end, parent, child)
    }

    fn binary_score(
        &self, begin: usize, split: usize, end: usize, parent: usize, left: usize, right: usize,
    ) -> f64 {
        (**self).binary_score(begin, split, end, parent, left, right)
    }
}
