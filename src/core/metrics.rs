/// Compound annual growth rate in percent.
///
/// Returns exactly 0 unless `start > 0`, `end > 0` and `years > 0`.
pub fn cagr(start: f64, end: f64, years: i32) -> f64 {
    if start > 0.0 && end > 0.0 && years > 0 {
        ((end / start).powf(1.0 / f64::from(years)) - 1.0) * 100.0
    } else {
        0.0
    }
}

/// `part` as a percentage of `whole`; exactly 0 when `whole` is not positive.
pub fn market_share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
