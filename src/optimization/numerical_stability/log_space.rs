//! Log-space reductions.
//!
//! All functions follow the same guarded max-shift strategy:
//! `ln Σ eˣ = m + ln Σ e^(x − m)` with `m = max x`. When `m` is `-∞` (empty
//! input or every term impossible) the shift would produce `-∞ − -∞ = NaN`,
//! so the reduction short-circuits to `-∞` instead.

/// Tolerance for probability-mass checks (`|Σ p − 1| ≤ PROB_TOL`).
pub const PROB_TOL: f64 = 1e-9;

/// `ln(eᵃ + eᵇ)`.
///
/// `log_add(-∞, x) = x` for every `x`, so a cell initialised to `-∞` can be
/// accumulated into without a special first write.
pub fn log_add(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::NEG_INFINITY || lo == f64::NEG_INFINITY {
        return hi;
    }
    if hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// `ln Σ eˣ` over a slice; `-∞` for an empty or all-`-∞` slice.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    log_sum_exp_iter(values.iter().copied())
}

/// `ln Σ eˣ` over an iterator.
///
/// The iterator is traversed twice (once for the max, once for the sum), so it
/// must be `Clone`; slices and ndarray iterators are cheap to clone.
pub fn log_sum_exp_iter<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let max = iter.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let sum: f64 = iter.map(|v| (v - max).exp()).sum();
    max + sum.ln()
}
