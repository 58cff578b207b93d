use clap::Parser;
use market_etl::core::ConfigProvider;
use market_etl::utils::{logger, validation::Validate};
use market_etl::{EtlEngine, EtlError, LocalStorage, MarketPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Market ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "market-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Parse and analyze the source without writing any output
    #[arg(long)]
    dry_run: bool,
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
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    logger::init_cli_logger(args.verbose, config.log_format());

    tracing::info!("🚀 Starting TOML-based market ETL");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let catalog = match config.load_catalog() {
        Ok(catalog) => catalog,
        Err(e) => fail(&e),
    };

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = MarketPipeline::new(storage, config, catalog);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        match engine.analyze().await {
            Ok(result) => print_dry_run(&result),
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(run) => {
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let window = config.analysis_window();
    let formats: Vec<String> = config.output_formats().iter().map(|f| f.to_string()).collect();

    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("-")
    );
    println!("  Source: {}", config.source.location);
    println!("  Window: {} → {}", window.base_year, window.forecast_year);
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", formats.join(", "));

    if config.compress_output() {
        println!("  Compression: {} (ZIP)", config.archive_name());
    }
    if let Some(editorial) = &config.editorial {
        println!("  Editorial: {}", editorial.catalog_path);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn print_dry_run(result: &market_etl::TransformResult) {
    let model = &result.model;

    println!("🔍 Dry Run Analysis:");
    println!("  Records: {}", result.record_count);
    println!("  Regions: {}", model.regions.len());
    println!("  Product types: {}", model.product_types.len());
    println!("  Countries: {}", model.countries.len());
    println!(
        "  Market size: {:.2} → {:.2} USD million (CAGR {:.1}%)",
        result.totals.market_size_base, result.totals.market_size_forecast, result.totals.cagr
    );

    if !result.parse_warnings.is_empty() {
        println!();
        println!("⚠️ Parse warnings:");
        for warning in &result.parse_warnings {
            println!("  {}", warning);
        }
    }
    if !result.validation_warnings.is_empty() {
        println!();
        println!("⚠️ Validation warnings:");
        for warning in &result.validation_warnings {
            println!("  {}", warning);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Nothing was written.");
}
