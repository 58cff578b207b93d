use crate::domain::diagnostics::{DuplicateRow, ParseWarning, ValidationWarning};
use crate::domain::editorial::{MarketPlayer, MarketTrend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One typed row of the market-sizing dataset. `value` is in USD millions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub region: String,
    pub segment_type: String,
    pub segment_name: String,
    pub year: i32,
    pub value: f64,
}

impl Record {
    pub fn new(
        region: impl Into<String>,
        segment_type: impl Into<String>,
        segment_name: impl Into<String>,
        year: i32,
        value: f64,
    ) -> Self {
        Self {
            region: region.into(),
            segment_type: segment_type.into(),
            segment_name: segment_name.into(),
            year,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// Points sorted ascending by year, one per year.
pub type TimeSeries = Vec<TimeSeriesPoint>;

/// segment name → series
pub type SegmentMap = BTreeMap<String, TimeSeries>;

/// segment type → segment name → series
pub type SegmentTypeMap = BTreeMap<String, SegmentMap>;

/// region → segment type → segment name → series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedData {
    regions: BTreeMap<String, SegmentTypeMap>,
}

impl GroupedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = (&str, &SegmentTypeMap)> {
        self.regions.iter().map(|(name, types)| (name.as_str(), types))
    }

    pub fn region(&self, region: &str) -> Option<&SegmentTypeMap> {
        self.regions.get(region)
    }

    pub fn segments(&self, region: &str, segment_type: &str) -> Option<&SegmentMap> {
        self.region(region)?.get(segment_type)
    }

    pub fn series(&self, region: &str, segment_type: &str, segment_name: &str) -> Option<&TimeSeries> {
        self.segments(region, segment_type)?.get(segment_name)
    }

    pub(crate) fn series_entry(
        &mut self,
        region: &str,
        segment_type: &str,
        segment_name: &str,
    ) -> &mut TimeSeries {
        self.regions
            .entry(region.to_string())
            .or_default()
            .entry(segment_type.to_string())
            .or_default()
            .entry(segment_name.to_string())
            .or_default()
    }

    pub(crate) fn series_mut(&mut self) -> impl Iterator<Item = &mut TimeSeries> {
        self.regions
            .values_mut()
            .flat_map(|types| types.values_mut())
            .flat_map(|segments| segments.values_mut())
    }

    /// Number of (year, value) points across every series.
    pub fn point_count(&self) -> usize {
        self.rows().count()
    }

    /// Flattens back to records, in key order then year order.
    pub fn rows(&self) -> impl Iterator<Item = Record> + '_ {
        self.regions.iter().flat_map(|(region, types)| {
            types.iter().flat_map(move |(segment_type, segments)| {
                segments.iter().flat_map(move |(segment_name, series)| {
                    series.iter().map(move |point| {
                        Record::new(
                            region.as_str(),
                            segment_type.as_str(),
                            segment_name.as_str(),
                            point.year,
                            point.value,
                        )
                    })
                })
            })
        })
    }
}

/// Base and forecast years of the projection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub base_year: i32,
    pub forecast_year: i32,
}

impl AnalysisWindow {
    pub const DEFAULT_BASE_YEAR: i32 = 2024;
    pub const DEFAULT_FORECAST_YEAR: i32 = 2032;

    pub fn new(base_year: i32, forecast_year: i32) -> Self {
        Self {
            base_year,
            forecast_year,
        }
    }

    /// Compounding periods between the two years.
    pub fn years(&self) -> i32 {
        self.forecast_year - self.base_year
    }
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_YEAR, Self::DEFAULT_FORECAST_YEAR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTotals {
    pub base_year: i32,
    pub forecast_year: i32,
    pub market_size_base: f64,
    pub market_size_forecast: f64,
    pub cagr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub title: String,
    pub description: String,
    pub key_findings: Vec<String>,
    pub base_year: i32,
    pub forecast_year: i32,
    pub market_size_base: f64,
    pub market_size_forecast: f64,
    pub cagr: f64,
}

/// Sizes, shares and growth shared by every summary row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentMetrics {
    pub market_size_base: f64,
    pub market_size_forecast: f64,
    /// Share of the global base-year total, in percent.
    pub market_share: f64,
    /// Share of the global forecast-year total, in percent.
    pub market_share_forecast: f64,
    pub cagr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub name: String,
    #[serde(flatten)]
    pub metrics: SegmentMetrics,
    pub key_markets: Vec<String>,
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub name: String,
    #[serde(flatten)]
    pub metrics: SegmentMetrics,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub region: String,
    pub market_size_base: f64,
    pub market_size_forecast: f64,
    pub cagr: f64,
    pub population: f64,
    pub penetration_rate: f64,
    pub average_spending: f64,
}

/// Read-only snapshot consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainModel {
    pub overview: Overview,
    pub regions: Vec<RegionSummary>,
    pub product_types: Vec<SegmentSummary>,
    pub ingredients: Vec<SegmentSummary>,
    pub gender: Vec<SegmentSummary>,
    pub end_users: Vec<SegmentSummary>,
    pub countries: BTreeMap<String, CountrySummary>,
    pub time_series: GroupedData,
    pub market_players: Vec<MarketPlayer>,
    pub trends: Vec<MarketTrend>,
}

/// Parser output: typed records plus the per-row warnings.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub records: Vec<Record>,
    pub warnings: Vec<ParseWarning>,
    pub headers: Vec<String>,
    pub delimiter: u8,
    pub source_label: String,
}

/// Everything one pipeline run produces, owned by the caller.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub model: DomainModel,
    pub totals: MarketTotals,
    pub parse_warnings: Vec<ParseWarning>,
    pub validation_warnings: Vec<ValidationWarning>,
    pub duplicate_rows: Vec<DuplicateRow>,
    pub record_count: usize,
    pub source_label: String,
}

impl TransformResult {
    pub fn has_warnings(&self) -> bool {
        !self.parse_warnings.is_empty() || !self.validation_warnings.is_empty()
    }
}
