use crate::config::OutputFormat;
use crate::core::source::Source;
use crate::domain::model::{AnalysisWindow, ParsedSource, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> Source;
    fn output_path(&self) -> &str;
    fn analysis_window(&self) -> AnalysisWindow;
    fn output_formats(&self) -> &[OutputFormat];
    fn compress_output(&self) -> bool;
    fn archive_name(&self) -> &str {
        "market_etl_output.zip"
    }
    /// `None` means detect from the header line.
    fn delimiter(&self) -> Option<u8>;
    /// Allowed distance, in percentage points, of summed shares from 100.
    fn share_tolerance(&self) -> f64;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ParsedSource>;
    async fn transform(&self, parsed: ParsedSource) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
