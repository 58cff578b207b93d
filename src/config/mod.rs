pub mod cli;
pub mod toml_config;

use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::core::consistency::DEFAULT_SHARE_TOLERANCE;
#[cfg(feature = "cli")]
use crate::core::source::Source;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::AnalysisWindow;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_analysis_window, validate_path, validate_range, validate_source_location, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

pub fn default_output_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json, OutputFormat::Csv]
}

/// 分隔字元: 單一 ASCII 字元，或 `tab` / `\t`
pub fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => {
                    Ok(c as u8)
                }
                _ => Err(format!(
                    "Delimiter must be a single ASCII character or 'tab', got '{}'",
                    raw
                )),
            }
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "market-etl")]
#[command(about = "Turn market-research CSV exports into a dashboard market model")]
pub struct CliConfig {
    #[arg(long, short, help = "CSV file path or http(s) URL")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value_t = AnalysisWindow::DEFAULT_BASE_YEAR)]
    pub base_year: i32,

    #[arg(long, default_value_t = AnalysisWindow::DEFAULT_FORECAST_YEAR)]
    pub forecast_year: i32,

    #[arg(long, value_enum, value_delimiter = ',', default_values_t = default_output_formats())]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Bundle outputs into a single ZIP archive")]
    pub compress: bool,

    #[arg(long, help = "Editorial catalog (TOML)")]
    pub editorial: Option<String>,

    #[arg(long, value_parser = parse_delimiter, help = "Field delimiter (auto-detected when omitted)")]
    pub delimiter: Option<u8>,

    #[arg(long, default_value_t = DEFAULT_SHARE_TOLERANCE)]
    pub share_tolerance: f64,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory per phase")]
    pub monitor: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source(&self) -> Source {
        Source::from_location(&self.input)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn analysis_window(&self) -> AnalysisWindow {
        AnalysisWindow::new(self.base_year, self.forecast_year)
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn compress_output(&self) -> bool {
        self.compress
    }

    fn delimiter(&self) -> Option<u8> {
        self.delimiter
    }

    fn share_tolerance(&self) -> f64 {
        self.share_tolerance
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_source_location("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_analysis_window(self.base_year, self.forecast_year)?;
        validate_range("share_tolerance", self.share_tolerance, 0.0, 100.0)?;

        if self.formats.is_empty() {
            return Err(crate::utils::error::EtlError::MissingConfigError {
                field: "formats".to_string(),
            });
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_range("timeout_seconds", timeout, 1, 3600)?;
        }
        if let Some(path) = &self.editorial {
            validate_path("editorial", path)?;
        }
        Ok(())
    }
}
