//! NaN resolution for indicator series, applied once before the bar loop.
//!
//! Policy: backward-fill (each NaN takes the next defined value), then
//! mean-fill any trailing NaNs. A NaN must never reach position-sizing
//! arithmetic; the engine relies on this pass for that guarantee.

/// Resolve NaNs in a series. Returns a series of the same length with no
/// NaNs, unless every input value is NaN (then the input is returned as-is
/// and the caller's data validation should already have rejected it).
pub fn resolve_nans(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();

    let finite: Vec<f64> = out.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return out;
    }

    // Backward fill.
    let mut next_valid = f64::NAN;
    for v in out.iter_mut().rev() {
        if v.is_nan() {
            *v = next_valid;
        } else {
            next_valid = *v;
        }
    }

    // Trailing NaNs (no later value existed) take the series mean.
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    for v in out.iter_mut() {
        if v.is_nan() {
            *v = mean;
        }
    }

    out
}
