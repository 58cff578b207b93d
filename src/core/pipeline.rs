use crate::config::OutputFormat;
use crate::core::aggregator::compute_totals;
use crate::core::consistency::check_model;
use crate::core::export::{to_csv, to_json_document, warnings_of};
use crate::core::grouper::group_records;
use crate::core::parser::parse_text;
use crate::core::source::SourceReader;
use crate::core::transformer::Transformer;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::editorial::EditorialCatalog;
use crate::domain::model::{ParsedSource, TransformResult};
use crate::utils::error::Result;
use chrono::Utc;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const MODEL_FILENAME: &str = "market_model.json";
pub const DATA_FILENAME: &str = "market_data.csv";
pub const WARNINGS_FILENAME: &str = "warnings.json";

/// Parser → Grouper → Aggregator → Transformer, with the editorial
/// catalog injected by the caller.
pub struct MarketPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    catalog: EditorialCatalog,
    reader: SourceReader,
}

impl<S: Storage, C: ConfigProvider> MarketPipeline<S, C> {
    pub fn new(storage: S, config: C, catalog: EditorialCatalog) -> Self {
        let reader = SourceReader::new(config.request_timeout());
        Self {
            storage,
            config,
            catalog,
            reader,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 依設定產生各輸出檔案的內容
    fn render_outputs(&self, result: &TransformResult) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Json => {
                    let json = to_json_document(result, Utc::now())?;
                    files.push((MODEL_FILENAME, json.into_bytes()));
                }
                OutputFormat::Csv => {
                    let csv = to_csv(&result.model.time_series)?;
                    files.push((DATA_FILENAME, csv.into_bytes()));
                }
            }
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MarketPipeline<S, C> {
    async fn extract(&self) -> Result<ParsedSource> {
        let source = self.config.source();
        let label = source.label();

        tracing::debug!("Reading market data from: {}", label);
        let content = self.reader.read_text(&source).await?;
        tracing::debug!("Read {} bytes", content.len());

        parse_text(&content, self.config.delimiter(), &label)
    }

    async fn transform(&self, parsed: ParsedSource) -> Result<TransformResult> {
        let window = self.config.analysis_window();

        for warning in &parsed.warnings {
            tracing::debug!("Row warning: {}", warning);
        }
        if !parsed.warnings.is_empty() {
            tracing::warn!("⚠️ {} row(s) had parse warnings", parsed.warnings.len());
        }

        let grouping = group_records(&parsed.records);
        tracing::debug!(
            "Grouped {} points into {} region(s)",
            grouping.data.point_count(),
            grouping.data.regions().count()
        );

        let totals = compute_totals(&grouping.data, &window);
        let model = Transformer::new(&self.catalog, window).transform(&grouping.data, &totals);

        let validation_warnings = check_model(
            &model,
            parsed.records.len(),
            &grouping.duplicates,
            self.config.share_tolerance(),
        );

        Ok(TransformResult {
            model,
            totals,
            parse_warnings: parsed.warnings,
            validation_warnings,
            duplicate_rows: grouping.duplicates,
            record_count: parsed.records.len(),
            source_label: parsed.source_label,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        let files = self.render_outputs(result)?;

        if !self.config.compress_output() {
            for (name, data) in &files {
                tracing::debug!("Writing {} ({} bytes)", name, data.len());
                self.storage.write_file(name, data).await?;
            }
            return Ok(output_path.to_string());
        }

        let archive_name = self.config.archive_name();
        tracing::debug!("Creating ZIP file with {} files", files.len() + 1);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (name, data) in &files {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(data)?;
            }

            zip.start_file::<_, ()>(WARNINGS_FILENAME, FileOptions::default())?;
            let warnings = serde_json::to_string_pretty(&warnings_of(result))?;
            zip.write_all(warnings.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(format!("{}/{}", output_path, archive_name))
    }
}
