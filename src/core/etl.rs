use crate::core::Pipeline;
use crate::domain::model::TransformResult;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Output location plus the in-memory result of one run.
#[derive(Debug, Clone)]
pub struct EtlRun {
    pub output_path: String,
    pub result: TransformResult,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract + transform only; nothing is written.
    pub async fn analyze(&self) -> Result<TransformResult> {
        tracing::info!("📥 Extracting market data...");
        let parsed = self.pipeline.extract().await?;
        tracing::info!(
            "📊 Parsed {} records ({} warnings)",
            parsed.records.len(),
            parsed.warnings.len()
        );
        self.monitor.log_phase("extract");

        tracing::info!("🔄 Building market model...");
        let result = self.pipeline.transform(parsed).await?;
        tracing::info!(
            "✅ Market size {:.2} → {:.2} USD million (CAGR {:.1}%)",
            result.totals.market_size_base,
            result.totals.market_size_forecast,
            result.totals.cagr
        );
        self.monitor.log_phase("transform");

        Ok(result)
    }

    pub async fn run(&self) -> Result<EtlRun> {
        tracing::info!("🚀 Starting ETL process...");

        let result = self.analyze().await?;

        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(&result).await?;
        self.monitor.log_phase("load");
        tracing::info!("📁 Output saved to: {}", output_path);

        self.monitor.log_final_stats();
        Ok(EtlRun {
            output_path,
            result,
        })
    }
}
