//! Null-guarded arithmetic shared by every engine.
//!
//! Absent data is modeled as `None` all the way through, so the guards for
//! missing operands, zero denominators, and non-finite results live here
//! instead of being re-spelled at each call site.

/// Divide two bare floats, yielding `None` for a zero denominator or a
/// non-finite quotient.
pub fn safe_ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let ratio = num / den;
    if ratio.is_finite() {
        Some(ratio)
    } else {
        None
    }
}

/// Divide two optional floats. Missing operands propagate.
pub fn safe_div(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) => safe_ratio(n, d),
        _ => None,
    }
}

/// Compound annual growth rate of a newest-first series.
///
/// Needs at least two points and strictly positive endpoints; the span is
/// capped at three years so a long tail cannot dilute recent growth.
pub fn series_cagr(series: &[f64]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let newest = series[0];
    let oldest = series[series.len() - 1];
    if newest <= 0.0 || oldest <= 0.0 {
        return None;
    }
    let years = (series.len() - 1).min(3) as f64;
    let cagr = (newest / oldest).powf(1.0 / years) - 1.0;
    if cagr.is_finite() {
        Some(cagr)
    } else {
        None
    }
}

/// Scale a unit-interval value to an integer score (0-100).
pub fn round_score(unit: f64) -> u32 {
    (unit.clamp(0.0, 1.0) * 100.0).round() as u32
}
