//! Bucket flat records into `region → segment type → segment name → series`.
//!
//! ```text
//! Global,Type,Mesotherapy,2032,2015.5      Global
//! Global,Type,Mesotherapy,2024,823.9   →    └─ Type
//! Global,Type,Micro-needle,2024,534.3          ├─ Mesotherapy: [2024, 2032]
//!                                              └─ Micro-needle: [2024]
//! ```
//!
//! A repeated (region, segment type, segment name, year) key keeps the
//! value of the row that came last; every replacement is reported.

use crate::domain::diagnostics::DuplicateRow;
use crate::domain::model::{GroupedData, Record, TimeSeriesPoint};

#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub data: GroupedData,
    pub duplicates: Vec<DuplicateRow>,
}

pub fn group_records(records: &[Record]) -> Grouping {
    let mut data = GroupedData::new();
    let mut duplicates = Vec::new();

    for record in records {
        let series = data.series_entry(&record.region, &record.segment_type, &record.segment_name);

        match series.iter_mut().find(|point| point.year == record.year) {
            Some(existing) => {
                duplicates.push(DuplicateRow {
                    region: record.region.clone(),
                    segment_type: record.segment_type.clone(),
                    segment_name: record.segment_name.clone(),
                    year: record.year,
                    replaced_value: existing.value,
                    kept_value: record.value,
                });
                existing.value = record.value;
            }
            None => series.push(TimeSeriesPoint {
                year: record.year,
                value: record.value,
            }),
        }
    }

    for series in data.series_mut() {
        series.sort_by_key(|point| point.year);
    }

    if !duplicates.is_empty() {
        tracing::warn!(
            "{} duplicate row(s) replaced by later values",
            duplicates.len()
        );
    }

    Grouping { data, duplicates }
}
