//! Delimited text → typed [`Record`]s.
//!
//! Headers are matched after normalisation (trimmed, punctuation stripped,
//! whitespace collapsed, lower-cased), so `Value (USD Thousand)` and
//! `value usd  thousand` address the same column. Row-level problems never
//! abort the parse; they become [`ParseWarning`]s.

use crate::domain::diagnostics::{ParseWarning, RowAction};
use crate::domain::model::{ParsedSource, Record};
use crate::utils::error::{Result, SourceError};
use csv::StringRecord;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

const REGION: &str = "Region";
const SEGMENT_TYPE: &str = "Segment Type";
const SEGMENT_NAME: &str = "Segment Name";
const YEAR: &str = "Year";
const VALUE: &str = "Value (USD Thousand)";

/// Unit of the source value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUnit {
    Thousand,
    Million,
}

impl ValueUnit {
    pub fn to_millions(self, value: f64) -> f64 {
        match self {
            ValueUnit::Thousand => value / 1000.0,
            ValueUnit::Million => value,
        }
    }
}

/// Column positions resolved once from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub region: usize,
    pub segment_type: usize,
    pub segment_name: usize,
    pub year: usize,
    pub value: usize,
    pub unit: ValueUnit,
}

impl ColumnMap {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let value = normalized.iter().enumerate().find_map(|(i, h)| match h.as_str() {
            "value usd thousand" | "value" => Some((i, ValueUnit::Thousand)),
            "value usd million" => Some((i, ValueUnit::Million)),
            _ => None,
        });

        let region = find("region");
        let segment_type = find("segment type");
        let segment_name = find("segment name");
        let year = find("year");

        match (region, segment_type, segment_name, year, value) {
            (Some(region), Some(segment_type), Some(segment_name), Some(year), Some((value, unit))) => {
                Ok(Self {
                    region,
                    segment_type,
                    segment_name,
                    year,
                    value,
                    unit,
                })
            }
            _ => {
                let missing = [
                    (REGION, region.is_some()),
                    (SEGMENT_TYPE, segment_type.is_some()),
                    (SEGMENT_NAME, segment_name.is_some()),
                    (YEAR, year.is_some()),
                    (VALUE, value.is_some()),
                ]
                .iter()
                .filter(|(_, found)| !found)
                .map(|(name, _)| name.to_string())
                .collect();
                Err(SourceError::MissingColumns { missing }.into())
            }
        }
    }
}

pub fn normalize_header(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Picks the candidate delimiter that occurs most often in the header line.
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let mut best = b',';
    let mut best_count = 0;
    for &candidate in &CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best_count = count;
            best = candidate;
        }
    }
    best
}

pub fn parse_text(content: &str, delimiter: Option<u8>, source_label: &str) -> Result<ParsedSource> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Empty {
            location: source_label.to_string(),
        }
        .into());
    }
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(&row, &columns, line) {
            Ok((record, warning)) => {
                records.push(record);
                warnings.extend(warning);
            }
            Err(warning) => warnings.push(warning),
        }
    }

    tracing::debug!(
        records = records.len(),
        warnings = warnings.len(),
        delimiter = %(delimiter as char).escape_default(),
        "Parsed {}",
        source_label
    );

    Ok(ParsedSource {
        records,
        warnings,
        headers,
        delimiter,
        source_label: source_label.to_string(),
    })
}

/// `Err` means the row was dropped; `Ok` may still carry a defaulting warning.
fn parse_row(
    row: &StringRecord,
    columns: &ColumnMap,
    line: u64,
) -> std::result::Result<(Record, Option<ParseWarning>), ParseWarning> {
    let field = |index: usize| row.get(index).unwrap_or("");

    let region = field(columns.region);
    let segment_type = field(columns.segment_type);
    let segment_name = field(columns.segment_name);

    for (column, value) in [
        (REGION, region),
        (SEGMENT_TYPE, segment_type),
        (SEGMENT_NAME, segment_name),
    ] {
        if value.is_empty() {
            return Err(ParseWarning::new(line, RowAction::Dropped, "Missing key field")
                .with_column(column));
        }
    }

    let raw_year = field(columns.year);
    let year = raw_year.parse::<i32>().map_err(|_| {
        ParseWarning::new(line, RowAction::Dropped, "Year is not an integer")
            .with_column(YEAR)
            .with_value(raw_year)
    })?;

    let raw_value = field(columns.value);
    let (value, warning) = match raw_value.parse::<f64>() {
        Ok(v) if v.is_finite() => (columns.unit.to_millions(v), None),
        _ => (
            0.0,
            Some(
                ParseWarning::new(line, RowAction::Defaulted, "Value is not numeric, using 0")
                    .with_column(VALUE)
                    .with_value(raw_value),
            ),
        ),
    };

    Ok((
        Record::new(region, segment_type, segment_name, year, value),
        warning,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    const HEADER: &str = "Region,Segment Type,Segment Name,Year,Value (USD Thousand)";

    fn parse(body: &str) -> ParsedSource {
        parse_text(&format!("{}\n{}", HEADER, body), None, "test").unwrap()
    }

    #[test]
    fn test_values_converted_to_millions() {
        let parsed = parse("Global,Type,Mesotherapy,2024,823932.7502");

        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.region, "Global");
        assert_eq!(record.segment_type, "Type");
        assert_eq!(record.year, 2024);
        assert!((record.value - 823.9327502).abs() < 1e-9);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_malformed_year_dropped_with_warning() {
        let parsed = parse("Global,Type,Mesotherapy,abc,100\nGlobal,Type,Mesotherapy,2032,200");

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        let warning = &parsed.warnings[0];
        assert_eq!(warning.action, RowAction::Dropped);
        assert_eq!(warning.line, 2);
        assert_eq!(warning.value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_bad_value_defaults_to_zero() {
        let parsed = parse("Global,Type,Mesotherapy,2024,n/a\nGlobal,Type,Micro-needle,2024,");

        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.records.iter().all(|r| r.value == 0.0));
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed
            .warnings
            .iter()
            .all(|w| w.action == RowAction::Defaulted));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let parsed = parse("Global,Type,A,2024,1000\n\n   \nGlobal,Type,B,2024,2000\n");
        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_extra_columns_and_header_variants() {
        let text = "  region ; SEGMENT TYPE;Segment Name:;year;Value (USD  thousand);Notes\n\
                    Europe;Country;Germany;2024;120000;estimated";
        let parsed = parse_text(text, None, "test").unwrap();

        assert_eq!(parsed.delimiter, b';');
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].segment_name, "Germany");
        assert!((parsed.records[0].value - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_million_column_is_not_converted() {
        let text = "Region,Segment Type,Segment Name,Year,Value (USD Million)\nGlobal,Type,A,2024,12.5";
        let parsed = parse_text(text, None, "test").unwrap();
        assert_eq!(parsed.records[0].value, 12.5);
    }

    #[test]
    fn test_missing_columns_is_source_error() {
        let err = parse_text("Region,Year\nGlobal,2024", None, "test").unwrap_err();
        match err {
            EtlError::Source(SourceError::MissingColumns { missing }) => {
                assert_eq!(
                    missing,
                    vec!["Segment Type", "Segment Name", "Value (USD Thousand)"]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_field_drops_row() {
        let parsed = parse(",Type,A,2024,100");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.warnings[0].column.as_deref(), Some("Region"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Value (USD Thousand) "), "value usd thousand");
        assert_eq!(normalize_header("Segment\tType"), "segment type");
    }
}
