//! Export surfaces: a JSON document (metadata + model + warnings) and a
//! CSV projection of `time_series`.

use crate::domain::diagnostics::{ParseWarning, ValidationWarning};
use crate::domain::model::{DomainModel, GroupedData, TransformResult};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 5] = [
    "Region",
    "Segment Type",
    "Segment Name",
    "Year",
    "Value (USD Million)",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub record_count: usize,
    pub base_year: i32,
    pub forecast_year: i32,
    pub generator: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportWarnings {
    pub parse: Vec<ParseWarning>,
    pub validation: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub data: DomainModel,
    pub warnings: ExportWarnings,
}

impl ExportDocument {
    pub fn from_result(result: &TransformResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            metadata: ExportMetadata {
                generated_at,
                source: result.source_label.clone(),
                record_count: result.record_count,
                base_year: result.totals.base_year,
                forecast_year: result.totals.forecast_year,
                generator: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            data: result.model.clone(),
            warnings: warnings_of(result),
        }
    }
}

pub fn warnings_of(result: &TransformResult) -> ExportWarnings {
    ExportWarnings {
        parse: result.parse_warnings.clone(),
        validation: result.validation_warnings.clone(),
    }
}

pub fn to_json_document(result: &TransformResult, generated_at: DateTime<Utc>) -> Result<String> {
    let document = ExportDocument::from_result(result, generated_at);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Flattens the time series back to CSV rows in key order.
pub fn to_csv(time_series: &GroupedData) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in time_series.rows() {
        let year = record.year.to_string();
        let value = record.value.to_string();
        writer.write_record([
            record.region.as_str(),
            record.segment_type.as_str(),
            record.segment_name.as_str(),
            year.as_str(),
            value.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV export: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV export is not valid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grouper::group_records;
    use crate::core::parser::parse_text;
    use crate::domain::model::Record;

    #[test]
    fn test_csv_export_layout() {
        let grouped = group_records(&[
            Record::new("Global", "Type", "Micro-needle", 2032, 1187.917396),
            Record::new("Global", "Type", "Micro-needle", 2024, 534.3172498),
            Record::new("Europe", "Country", "Germany", 2024, 120.0),
        ])
        .data;

        let csv = to_csv(&grouped).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Region,Segment Type,Segment Name,Year,Value (USD Million)");
        assert_eq!(lines[1], "Europe,Country,Germany,2024,120");
        assert_eq!(lines[2], "Global,Type,Micro-needle,2024,534.3172498");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_export_can_be_parsed_again() {
        let grouped = group_records(&[Record::new("Global", "Type", "Mesotherapy", 2024, 823.9)]).data;

        let csv = to_csv(&grouped).unwrap();
        let parsed = parse_text(&csv, None, "export").unwrap();

        assert_eq!(parsed.records, vec![Record::new("Global", "Type", "Mesotherapy", 2024, 823.9)]);
    }
}
