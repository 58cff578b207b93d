use crate::config::{default_output_formats, parse_delimiter, OutputFormat};
use crate::core::consistency::DEFAULT_SHARE_TOLERANCE;
use crate::core::source::Source;
use crate::core::ConfigProvider;
use crate::domain::editorial::EditorialCatalog;
use crate::domain::model::AnalysisWindow;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_analysis_window, validate_non_empty_string, validate_path, validate_range,
    validate_source_location, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub load: LoadConfig,
    pub editorial: Option<EditorialConfig>,
    pub monitoring: Option<MonitoringConfig>,
    /// 解析後的分隔字元，由 `source.delimiter` 轉換而來
    #[serde(skip)]
    delimiter: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 本機路徑或 http(s) URL
    pub location: String,
    pub delimiter: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub base_year: i32,
    pub forecast_year: i32,
    pub share_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_year: AnalysisWindow::DEFAULT_BASE_YEAR,
            forecast_year: AnalysisWindow::DEFAULT_FORECAST_YEAR,
            share_tolerance: DEFAULT_SHARE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorialConfig {
    pub catalog_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<LogFormat>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        config.delimiter = match config.source.delimiter.as_deref() {
            Some(raw) => Some(parse_delimiter(raw).map_err(|reason| {
                EtlError::InvalidConfigValueError {
                    field: "source.delimiter".to_string(),
                    value: raw.to_string(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(config)
    }

    /// 替換環境變數 (例如 ${DATA_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        if self.source.location.contains("${") {
            return Err(EtlError::MissingConfigError {
                field: "source.location".to_string(),
            });
        }
        validate_source_location("source.location", &self.source.location)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 3600)?;
        }

        validate_analysis_window(self.analysis.base_year, self.analysis.forecast_year)?;
        validate_range(
            "analysis.share_tolerance",
            self.analysis.share_tolerance,
            0.0,
            100.0,
        )?;

        validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }

        if let Some(filename) = self.compression_filename() {
            if !filename.ends_with(".zip") {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.compression.filename".to_string(),
                    value: filename.to_string(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        if let Some(editorial) = &self.editorial {
            validate_path("editorial.catalog_path", &editorial.catalog_path)?;
        }

        Ok(())
    }

    fn compression_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
    }

    /// 載入編輯內容，未設定時使用空目錄
    pub fn load_catalog(&self) -> Result<EditorialCatalog> {
        match &self.editorial {
            Some(editorial) => {
                let catalog = EditorialCatalog::from_file(&editorial.catalog_path)?;
                catalog.validate()?;
                Ok(catalog)
            }
            None => Ok(EditorialCatalog::default()),
        }
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> Source {
        Source::from_location(&self.source.location)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn analysis_window(&self) -> AnalysisWindow {
        AnalysisWindow::new(self.analysis.base_year, self.analysis.forecast_year)
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn compress_output(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn archive_name(&self) -> &str {
        self.compression_filename()
            .unwrap_or("market_etl_output.zip")
    }

    fn delimiter(&self) -> Option<u8> {
        self.delimiter
    }

    fn share_tolerance(&self) -> f64 {
        self.analysis.share_tolerance
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
