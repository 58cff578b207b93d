//! Editorial content for the dashboard (descriptions, drivers, country
//! demographics, players, trends). Supplied by the caller; any name the
//! catalog does not know falls back to [`EditorialDefaults`].

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorialCatalog {
    pub overview: OverviewText,
    pub defaults: EditorialDefaults,
    pub regions: BTreeMap<String, RegionEditorial>,
    pub product_types: BTreeMap<String, SegmentEditorial>,
    pub ingredients: BTreeMap<String, SegmentEditorial>,
    pub gender: BTreeMap<String, SegmentEditorial>,
    pub end_users: BTreeMap<String, SegmentEditorial>,
    pub countries: BTreeMap<String, CountryProfile>,
    pub market_players: Vec<MarketPlayer>,
    pub trends: Vec<MarketTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewText {
    pub title: String,
    pub description: String,
    pub key_findings: Vec<String>,
}

impl Default for OverviewText {
    fn default() -> Self {
        Self {
            title: "Market Overview".to_string(),
            description: "Market size and growth outlook derived from the uploaded dataset."
                .to_string(),
            key_findings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorialDefaults {
    pub region_drivers: Vec<String>,
    /// `{name}` is replaced with the segment name.
    pub segment_description: String,
    pub applications: Vec<String>,
    pub benefits: Vec<String>,
    pub country: CountryProfile,
}

impl Default for EditorialDefaults {
    fn default() -> Self {
        Self {
            region_drivers: vec![
                "Growing demand for minimally invasive aesthetic procedures".to_string(),
                "Rising disposable income".to_string(),
            ],
            segment_description: "{name} segment of the cosmetic-treatment market".to_string(),
            applications: vec!["Skin rejuvenation".to_string(), "Anti-aging".to_string()],
            benefits: vec!["Improved skin texture".to_string(), "Hydration".to_string()],
            country: CountryProfile::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionEditorial {
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentEditorial {
    pub description: Option<String>,
    pub applications: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryProfile {
    /// Millions of inhabitants.
    pub population: f64,
    /// Percent of the population using treatments.
    pub penetration_rate: f64,
    /// USD per treated person per year.
    pub average_spending: f64,
}

impl Default for CountryProfile {
    fn default() -> Self {
        Self {
            population: 50.0,
            penetration_rate: 1.0,
            average_spending: 300.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketPlayer {
    pub name: String,
    pub headquarters: Option<String>,
    pub description: String,
    #[serde(alias = "key_products")]
    pub key_products: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketTrend {
    pub title: String,
    pub description: String,
    pub impact: Option<String>,
}

impl EditorialCatalog {
    /// 從 TOML 檔案載入編輯內容
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EtlError::ConfigValidationError {
            field: "editorial".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn region_drivers(&self, region: &str) -> Vec<String> {
        match self.regions.get(region) {
            Some(entry) if !entry.drivers.is_empty() => entry.drivers.clone(),
            _ => self.defaults.region_drivers.clone(),
        }
    }

    pub fn description(&self, table: &BTreeMap<String, SegmentEditorial>, name: &str) -> String {
        table
            .get(name)
            .and_then(|entry| entry.description.clone())
            .unwrap_or_else(|| self.defaults.segment_description.replace("{name}", name))
    }

    pub fn applications(&self, name: &str) -> Vec<String> {
        match self.product_types.get(name) {
            Some(entry) if !entry.applications.is_empty() => entry.applications.clone(),
            _ => self.defaults.applications.clone(),
        }
    }

    pub fn benefits(&self, name: &str) -> Vec<String> {
        match self.ingredients.get(name) {
            Some(entry) if !entry.benefits.is_empty() => entry.benefits.clone(),
            _ => self.defaults.benefits.clone(),
        }
    }

    pub fn country_profile(&self, country: &str) -> CountryProfile {
        self.countries
            .get(country)
            .copied()
            .unwrap_or(self.defaults.country)
    }
}

impl Validate for EditorialCatalog {
    fn validate(&self) -> Result<()> {
        for (name, profile) in &self.countries {
            validate_range(
                &format!("editorial.countries.{}.penetration_rate", name),
                profile.penetration_rate,
                0.0,
                100.0,
            )?;
            validate_range(
                &format!("editorial.countries.{}.population", name),
                profile.population,
                0.0,
                f64::MAX,
            )?;
        }
        for player in &self.market_players {
            validate_non_empty_string("editorial.market_players.name", &player.name)?;
        }
        Ok(())
    }
}
