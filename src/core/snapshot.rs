use crate::domain::model::{DomainModel, TransformResult};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// The last successful run and when its request started.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub result: TransformResult,
    pub source_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced,
    /// An older request finished after a newer one; its result was dropped.
    Stale,
}

/// Caller-owned holder for the model currently on screen.
///
/// Failed runs leave the previous snapshot untouched, and a run that
/// started before the current snapshot's run is discarded as stale.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    current: Option<Snapshot>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn model(&self) -> Option<&DomainModel> {
        self.current.as_ref().map(|snapshot| &snapshot.result.model)
    }

    pub fn apply(
        &mut self,
        outcome: Result<TransformResult>,
        started_at: DateTime<Utc>,
    ) -> Result<ApplyOutcome> {
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Run failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };

        if let Some(current) = &self.current {
            if current.source_timestamp > started_at {
                tracing::debug!(
                    "Discarding stale result started at {} (current {})",
                    started_at,
                    current.source_timestamp
                );
                return Ok(ApplyOutcome::Stale);
            }
        }

        self.current = Some(Snapshot {
            result,
            source_timestamp: started_at,
        });
        Ok(ApplyOutcome::Replaced)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::compute_totals;
    use crate::core::grouper::group_records;
    use crate::core::transformer::Transformer;
    use crate::domain::editorial::EditorialCatalog;
    use crate::domain::model::{AnalysisWindow, Record};
    use crate::utils::error::{EtlError, SourceError};
    use chrono::Duration;

    fn result_with(value: f64) -> TransformResult {
        let records = vec![Record::new("Global", "Type", "A", 2024, value)];
        let grouped = group_records(&records).data;
        let window = AnalysisWindow::default();
        let totals = compute_totals(&grouped, &window);
        let catalog = EditorialCatalog::default();
        TransformResult {
            model: Transformer::new(&catalog, window).transform(&grouped, &totals),
            totals,
            parse_warnings: Vec::new(),
            validation_warnings: Vec::new(),
            duplicate_rows: Vec::new(),
            record_count: records.len(),
            source_label: "test".to_string(),
        }
    }

    #[test]
    fn test_success_replaces_snapshot() {
        let mut state = DashboardState::new();
        let t0 = Utc::now();

        assert_eq!(state.apply(Ok(result_with(1.0)), t0).unwrap(), ApplyOutcome::Replaced);
        assert_eq!(
            state
                .apply(Ok(result_with(2.0)), t0 + Duration::seconds(1))
                .unwrap(),
            ApplyOutcome::Replaced
        );
        assert_eq!(state.model().unwrap().overview.market_size_base, 2.0);
    }

    #[test]
    fn test_error_keeps_previous_snapshot() {
        let mut state = DashboardState::new();
        let t0 = Utc::now();
        state.apply(Ok(result_with(1.0)), t0).unwrap();

        let failure: Result<TransformResult> = Err(EtlError::Source(SourceError::NotFound {
            path: "gone.csv".to_string(),
        }));
        assert!(state.apply(failure, t0 + Duration::seconds(1)).is_err());

        assert_eq!(state.model().unwrap().overview.market_size_base, 1.0);
        assert_eq!(state.current().unwrap().source_timestamp, t0);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut state = DashboardState::new();
        let t0 = Utc::now();
        state.apply(Ok(result_with(2.0)), t0).unwrap();

        let outcome = state
            .apply(Ok(result_with(1.0)), t0 - Duration::seconds(5))
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(state.model().unwrap().overview.market_size_base, 2.0);

        state.clear();
        assert!(state.model().is_none());
    }
}
