use crate::core::metrics::cagr;
use crate::domain::model::{AnalysisWindow, GroupedData, MarketTotals, TimeSeriesPoint};

pub const GLOBAL_REGION: &str = "Global";
pub const TYPE_SEGMENT: &str = "Type";

/// Value recorded for `year`, or 0 when the series has no such point.
pub fn value_at(series: &[TimeSeriesPoint], year: i32) -> f64 {
    series
        .iter()
        .find(|point| point.year == year)
        .map(|point| point.value)
        .unwrap_or(0.0)
}

/// Sum of every segment under `region/segment_type` for `year`.
pub fn bucket_total(grouped: &GroupedData, region: &str, segment_type: &str, year: i32) -> f64 {
    grouped
        .segments(region, segment_type)
        .map(|segments| segments.values().map(|series| value_at(series, year)).sum())
        .unwrap_or(0.0)
}

/// Market totals from the `Global/Type` bucket. Missing data yields zeros.
pub fn compute_totals(grouped: &GroupedData, window: &AnalysisWindow) -> MarketTotals {
    let market_size_base = bucket_total(grouped, GLOBAL_REGION, TYPE_SEGMENT, window.base_year);
    let market_size_forecast =
        bucket_total(grouped, GLOBAL_REGION, TYPE_SEGMENT, window.forecast_year);

    if grouped.region(GLOBAL_REGION).is_none() {
        tracing::warn!("No '{}' region in input, market totals default to 0", GLOBAL_REGION);
    }

    MarketTotals {
        base_year: window.base_year,
        forecast_year: window.forecast_year,
        market_size_base,
        market_size_forecast,
        cagr: cagr(market_size_base, market_size_forecast, window.years()),
    }
}
