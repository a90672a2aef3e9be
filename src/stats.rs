//! Statistical reducers
//!
//! Null-safe `average`, `min`, `max` and `sum` over a day's raw values. These
//! four are the only primitives; every higher-level summary composes them.
//!
//! `sum` of an empty set is `0.0` (no precipitation is a valid physical
//! total), while `average`/`min`/`max` of an empty set are `None`.

/// Arithmetic mean of the finite values, `None` when there are none
pub fn average(values: &[f64]) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values.iter().filter(|v| v.is_finite()) {
        total += value;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    finite(total / count as f64)
}

/// Smallest finite value, `None` when there are none
pub fn min(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
}

/// Largest finite value, `None` when there are none
pub fn max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}

/// Total of the finite values, `0.0` for an empty set.
///
/// A total that overflows saturates at `±f64::MAX`.
pub fn sum(values: &[f64]) -> f64 {
    let total: f64 = values.iter().filter(|v| v.is_finite()).sum();
    finite(total).unwrap_or_else(|| f64::MAX.copysign(total))
}

/// Round to a fixed number of decimals for presentation
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Drop results that overflowed to infinity
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
