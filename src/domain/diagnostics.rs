//! Non-fatal findings reported next to the domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a row that failed to parse cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Dropped,
    Defaulted,
}

/// A single malformed row, with the line it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub line: u64,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
    pub action: RowAction,
}

impl ParseWarning {
    pub fn new(line: u64, action: RowAction, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
            action,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => write!(
                f,
                "Line {}, column '{}' (value '{}'): {} [{:?}]",
                self.line, col, val, self.message, self.action
            ),
            (Some(col), None) => write!(
                f,
                "Line {}, column '{}': {} [{:?}]",
                self.line, col, self.message, self.action
            ),
            _ => write!(f, "Line {}: {} [{:?}]", self.line, self.message, self.action),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    NoRecords,
    EmptyRegions,
    MissingOverview,
    RegionalShareDrift,
    SegmentShareDrift,
    DuplicateRows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// A (region, segment type, segment name, year) key seen more than once.
/// The later row's value is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRow {
    pub region: String,
    pub segment_type: String,
    pub segment_name: String,
    pub year: i32,
    pub replaced_value: f64,
    pub kept_value: f64,
}
