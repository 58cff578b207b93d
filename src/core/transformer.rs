use crate::core::aggregator::{bucket_total, value_at, GLOBAL_REGION, TYPE_SEGMENT};
use crate::core::metrics::{cagr, market_share};
use crate::domain::editorial::EditorialCatalog;
use crate::domain::model::{
    AnalysisWindow, CountrySummary, DomainModel, GroupedData, MarketTotals, Overview,
    RegionSummary, SegmentMetrics, SegmentSummary, SegmentTypeMap, TimeSeries,
};
use std::collections::{BTreeMap, HashSet};

pub const INGREDIENT_SEGMENT: &str = "Ingredient";
pub const GENDER_SEGMENT: &str = "Gender";
pub const END_USER_SEGMENT: &str = "End User";
pub const COUNTRY_SEGMENT: &str = "Country";

/// Builds the [`DomainModel`] from grouped data, totals and editorial content.
pub struct Transformer<'a> {
    catalog: &'a EditorialCatalog,
    window: AnalysisWindow,
}

impl<'a> Transformer<'a> {
    pub fn new(catalog: &'a EditorialCatalog, window: AnalysisWindow) -> Self {
        Self { catalog, window }
    }

    pub fn transform(&self, grouped: &GroupedData, totals: &MarketTotals) -> DomainModel {
        DomainModel {
            overview: self.overview(totals),
            regions: self.regions(grouped, totals),
            product_types: self.global_segments(grouped, totals, TYPE_SEGMENT),
            ingredients: self.global_segments(grouped, totals, INGREDIENT_SEGMENT),
            gender: self.global_segments(grouped, totals, GENDER_SEGMENT),
            end_users: self.end_users(grouped, totals),
            countries: self.countries(grouped),
            time_series: grouped.clone(),
            market_players: self.catalog.market_players.clone(),
            trends: self.catalog.trends.clone(),
        }
    }

    fn overview(&self, totals: &MarketTotals) -> Overview {
        let text = &self.catalog.overview;
        Overview {
            title: text.title.clone(),
            description: text.description.clone(),
            key_findings: text.key_findings.clone(),
            base_year: totals.base_year,
            forecast_year: totals.forecast_year,
            market_size_base: totals.market_size_base,
            market_size_forecast: totals.market_size_forecast,
            cagr: totals.cagr,
        }
    }

    fn metrics(&self, base: f64, forecast: f64, totals: &MarketTotals) -> SegmentMetrics {
        SegmentMetrics {
            market_size_base: base,
            market_size_forecast: forecast,
            market_share: market_share(base, totals.market_size_base),
            market_share_forecast: market_share(forecast, totals.market_size_forecast),
            cagr: cagr(base, forecast, self.window.years()),
        }
    }

    fn series_metrics(&self, series: &TimeSeries, totals: &MarketTotals) -> SegmentMetrics {
        self.metrics(
            value_at(series, self.window.base_year),
            value_at(series, self.window.forecast_year),
            totals,
        )
    }

    fn regions(&self, grouped: &GroupedData, totals: &MarketTotals) -> Vec<RegionSummary> {
        grouped
            .regions()
            .filter(|(name, _)| *name != GLOBAL_REGION)
            .map(|(name, segment_types)| {
                let base = bucket_total(grouped, name, TYPE_SEGMENT, self.window.base_year);
                let forecast = bucket_total(grouped, name, TYPE_SEGMENT, self.window.forecast_year);
                let key_markets = segment_types
                    .get(COUNTRY_SEGMENT)
                    .map(|countries| countries.keys().cloned().collect())
                    .unwrap_or_default();

                RegionSummary {
                    name: name.to_string(),
                    metrics: self.metrics(base, forecast, totals),
                    key_markets,
                    drivers: self.catalog.region_drivers(name),
                }
            })
            .collect()
    }

    fn global_segments(
        &self,
        grouped: &GroupedData,
        totals: &MarketTotals,
        segment_type: &str,
    ) -> Vec<SegmentSummary> {
        let Some(segments) = grouped.segments(GLOBAL_REGION, segment_type) else {
            return Vec::new();
        };

        segments
            .iter()
            .map(|(name, series)| {
                let (description, applications, benefits) = match segment_type {
                    TYPE_SEGMENT => (
                        self.catalog.description(&self.catalog.product_types, name),
                        self.catalog.applications(name),
                        Vec::new(),
                    ),
                    INGREDIENT_SEGMENT => (
                        self.catalog.description(&self.catalog.ingredients, name),
                        Vec::new(),
                        self.catalog.benefits(name),
                    ),
                    GENDER_SEGMENT => (
                        self.catalog.description(&self.catalog.gender, name),
                        Vec::new(),
                        Vec::new(),
                    ),
                    _ => (
                        self.catalog.description(&BTreeMap::new(), name),
                        Vec::new(),
                        Vec::new(),
                    ),
                };

                SegmentSummary {
                    name: name.clone(),
                    metrics: self.series_metrics(series, totals),
                    description,
                    applications,
                    benefits,
                }
            })
            .collect()
    }

    /// Regions in visiting order: `Global` first, then key order.
    fn visiting_order<'g>(
        grouped: &'g GroupedData,
    ) -> impl Iterator<Item = (&'g str, &'g SegmentTypeMap)> {
        grouped
            .region(GLOBAL_REGION)
            .map(|types| (GLOBAL_REGION, types))
            .into_iter()
            .chain(grouped.regions().filter(|(name, _)| *name != GLOBAL_REGION))
    }

    fn end_users(&self, grouped: &GroupedData, totals: &MarketTotals) -> Vec<SegmentSummary> {
        let mut seen = HashSet::new();
        let mut end_users = Vec::new();

        for (_, segment_types) in Self::visiting_order(grouped) {
            let Some(segments) = segment_types.get(END_USER_SEGMENT) else {
                continue;
            };
            for (name, series) in segments {
                // 同名只取第一次出現
                if !seen.insert(name.as_str()) {
                    continue;
                }
                end_users.push(SegmentSummary {
                    name: name.clone(),
                    metrics: self.series_metrics(series, totals),
                    description: self.catalog.description(&self.catalog.end_users, name),
                    applications: Vec::new(),
                    benefits: Vec::new(),
                });
            }
        }
        end_users
    }

    fn countries(&self, grouped: &GroupedData) -> BTreeMap<String, CountrySummary> {
        let mut countries = BTreeMap::new();

        for (region, segment_types) in Self::visiting_order(grouped) {
            let Some(segments) = segment_types.get(COUNTRY_SEGMENT) else {
                continue;
            };
            for (name, series) in segments {
                if countries.contains_key(name) {
                    continue;
                }
                let base = value_at(series, self.window.base_year);
                let forecast = value_at(series, self.window.forecast_year);
                let profile = self.catalog.country_profile(name);

                countries.insert(
                    name.clone(),
                    CountrySummary {
                        region: region.to_string(),
                        market_size_base: base,
                        market_size_forecast: forecast,
                        cagr: cagr(base, forecast, self.window.years()),
                        population: profile.population,
                        penetration_rate: profile.penetration_rate,
                        average_spending: profile.average_spending,
                    },
                );
            }
        }
        countries
    }
}
