use crate::domain::diagnostics::{DuplicateRow, ValidationKind, ValidationWarning};
use crate::domain::model::DomainModel;

pub const DEFAULT_SHARE_TOLERANCE: f64 = 5.0;

/// Post-transform sanity checks. Findings are reported, never fatal.
pub fn check_model(
    model: &DomainModel,
    record_count: usize,
    duplicates: &[DuplicateRow],
    share_tolerance: f64,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if record_count == 0 {
        warnings.push(ValidationWarning::new(
            ValidationKind::NoRecords,
            "No usable records were parsed from the source",
        ));
    }

    if !duplicates.is_empty() {
        warnings.push(ValidationWarning::new(
            ValidationKind::DuplicateRows,
            format!(
                "{} duplicate row(s) found; the last value for each key was kept",
                duplicates.len()
            ),
        ));
    }

    if model.overview.market_size_base <= 0.0 {
        warnings.push(ValidationWarning::new(
            ValidationKind::MissingOverview,
            format!(
                "Global market size for {} is missing or zero",
                model.overview.base_year
            ),
        ));
    }

    if model.regions.is_empty() {
        warnings.push(ValidationWarning::new(
            ValidationKind::EmptyRegions,
            "No regional data found",
        ));
    } else if model.overview.market_size_base > 0.0 {
        let total: f64 = model.regions.iter().map(|r| r.metrics.market_share).sum();
        if (total - 100.0).abs() > share_tolerance {
            warnings.push(ValidationWarning::new(
                ValidationKind::RegionalShareDrift,
                format!("Regional market shares sum to {:.1}% instead of 100%", total),
            ));
        }
    }

    // Type 的占比必然合計 100，只檢查其他 Global 維度
    if model.overview.market_size_base > 0.0 {
        for (label, segments) in [("Ingredient", &model.ingredients), ("Gender", &model.gender)] {
            if segments.is_empty() {
                continue;
            }
            let total: f64 = segments.iter().map(|s| s.metrics.market_share).sum();
            if (total - 100.0).abs() > share_tolerance {
                warnings.push(ValidationWarning::new(
                    ValidationKind::SegmentShareDrift,
                    format!("{} shares sum to {:.1}% instead of 100%", label, total),
                ));
            }
        }
    }

    for warning in &warnings {
        tracing::warn!("⚠️ {}", warning);
    }
    warnings
}
