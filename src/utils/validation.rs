use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 輸入可以是本機路徑或 http(s) URL
pub fn validate_source_location(field_name: &str, location: &str) -> Result<()> {
    if location.starts_with("http://") || location.starts_with("https://") {
        validate_url(field_name, location)
    } else {
        validate_path(field_name, location)
    }
}

pub fn validate_analysis_window(base_year: i32, forecast_year: i32) -> Result<()> {
    validate_range("analysis.base_year", base_year, 1900, 2200)?;
    validate_range("analysis.forecast_year", forecast_year, 1900, 2200)?;

    if forecast_year <= base_year {
        return Err(EtlError::InvalidConfigValueError {
            field: "analysis.forecast_year".to_string(),
            value: forecast_year.to_string(),
            reason: format!("Forecast year must be after base year {}", base_year),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.location", "https://example.com/data.csv").is_ok());
        assert!(validate_url("source.location", "http://example.com").is_ok());
        assert!(validate_url("source.location", "").is_err());
        assert!(validate_url("source.location", "invalid-url").is_err());
        assert!(validate_url("source.location", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_source_location() {
        assert!(validate_source_location("input", "data/market.csv").is_ok());
        assert!(validate_source_location("input", "https://example.com/market.csv").is_ok());
        assert!(validate_source_location("input", "").is_err());
        assert!(validate_source_location("input", "https://").is_err());
    }

    #[test]
    fn test_validate_analysis_window() {
        assert!(validate_analysis_window(2024, 2032).is_ok());
        assert!(validate_analysis_window(2032, 2024).is_err());
        assert!(validate_analysis_window(2024, 2024).is_err());
        assert!(validate_analysis_window(24, 2032).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("pipeline.name", "market").is_ok());
        assert!(validate_non_empty_string("pipeline.name", "   ").is_err());
    }
}
