use clap::Parser;
use market_etl::utils::{logger, validation::Validate};
use market_etl::{CliConfig, EditorialCatalog, EtlEngine, EtlError, LocalStorage, MarketPipeline};

fn load_catalog(path: Option<&str>) -> Result<EditorialCatalog, EtlError> {
    match path {
        Some(path) => {
            tracing::info!("📚 Loading editorial catalog from: {}", path);
            let catalog = EditorialCatalog::from_file(path)?;
            catalog.validate()?;
            Ok(catalog)
        }
        None => Ok(EditorialCatalog::default()),
    }
}

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_format);

    tracing::info!("Starting market-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let catalog = match load_catalog(config.editorial.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => fail(&e),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = MarketPipeline::new(storage, config, catalog);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            let result = &run.result;
            println!("✅ ETL process completed successfully!");
            println!(
                "📊 {} records, market {:.2} → {:.2} USD million, CAGR {:.1}%",
                result.record_count,
                result.totals.market_size_base,
                result.totals.market_size_forecast,
                result.totals.cagr
            );
            if result.has_warnings() {
                println!(
                    "⚠️ {} parse warning(s), {} validation warning(s)",
                    result.parse_warnings.len(),
                    result.validation_warnings.len()
                );
            }
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
