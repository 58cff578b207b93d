use market_etl::core::ConfigProvider;
use market_etl::domain::diagnostics::{RowAction, ValidationKind};
use market_etl::{
    ApplyOutcome, DashboardState, EditorialCatalog, EtlEngine, EtlError, LocalStorage,
    MarketPipeline, SourceError, TomlConfig,
};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const SCENARIO: &str = "\
Region,Segment Type,Segment Name,Year,Value (USD Thousand)
Global,Type,Mesotherapy,2024,823932.7502
Global,Type,Mesotherapy,2032,2015525.275
Global,Type,Micro-needle,2024,534317.2498
Global,Type,Micro-needle,2032,1187917.396
";

fn sample_csv() -> String {
    format!("{}/data/sample_market.csv", env!("CARGO_MANIFEST_DIR"))
}

fn write_csv(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn toml_config(source: &str, output_path: &str, compress: bool) -> TomlConfig {
    TomlConfig::from_toml_str(&format!(
        r#"
[pipeline]
name = "integration"

[source]
location = "{source}"

[load]
output_path = "{output_path}"
output_formats = ["json", "csv"]

[load.compression]
enabled = {compress}
"#
    ))
    .unwrap()
}

fn engine(
    config: TomlConfig,
    catalog: EditorialCatalog,
) -> EtlEngine<MarketPipeline<LocalStorage, TomlConfig>> {
    let storage = LocalStorage::new(config.output_path().to_string());
    EtlEngine::new(MarketPipeline::new(storage, config, catalog))
}

#[tokio::test]
async fn test_end_to_end_with_sample_data() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().display().to_string();
    let catalog = EditorialCatalog::from_file(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("config/editorial.toml"),
    )
    .unwrap();

    let run = engine(toml_config(&sample_csv(), &output_path, false), catalog)
        .run()
        .await
        .unwrap();

    assert_eq!(run.output_path, output_path);
    let result = &run.result;
    assert!(result.parse_warnings.is_empty());
    assert!(result.validation_warnings.is_empty(), "{:?}", result.validation_warnings);

    let model = &result.model;
    assert!((model.overview.market_size_base - 1358.25).abs() < 0.01);
    assert!((model.overview.market_size_forecast - 3203.44).abs() < 0.01);
    assert!((model.overview.cagr - 11.3).abs() < 0.05);

    let region_names: Vec<&str> = model.regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        region_names,
        vec![
            "Asia Pacific",
            "Europe",
            "Latin America",
            "Middle East & Africa",
            "North America"
        ]
    );
    let north_america = &model.regions[4];
    assert_eq!(north_america.key_markets, vec!["United States"]);
    assert_eq!(north_america.drivers[0], "High awareness of aesthetic treatments");

    let end_users: Vec<&str> = model.end_users.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        end_users,
        vec!["Dermatology Clinics", "Home Use", "Medical Spas", "Clinics"]
    );

    assert_eq!(model.countries.len(), 6);
    assert_eq!(model.countries["South Korea"].region, "Asia Pacific");
    assert_eq!(model.countries["South Korea"].penetration_rate, 6.0);
    assert_eq!(model.market_players.len(), 3);

    let json = std::fs::read_to_string(temp_dir.path().join("market_model.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["metadata"]["generator"], "market-etl");
    assert_eq!(document["data"]["productTypes"][0]["name"], "Mesotherapy");

    let csv = std::fs::read_to_string(temp_dir.path().join("market_data.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1 + 52);
}

#[tokio::test]
async fn test_mesotherapy_scenario_shares() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_csv(&temp_dir, "scenario.csv", SCENARIO);
    let output_path = temp_dir.path().join("out").display().to_string();

    let result = engine(
        toml_config(&source, &output_path, false),
        EditorialCatalog::default(),
    )
    .analyze()
    .await
    .unwrap();

    let mesotherapy = &result.model.product_types[0];
    assert_eq!(mesotherapy.name, "Mesotherapy");
    assert!((mesotherapy.metrics.market_share - 60.7).abs() < 0.1);
    assert_eq!(
        mesotherapy.description,
        "Mesotherapy segment of the cosmetic-treatment market"
    );

    // 只有 Global 沒有區域資料
    assert!(result
        .validation_warnings
        .iter()
        .any(|w| w.kind == ValidationKind::EmptyRegions));
    assert!(!Path::new(&output_path).exists());
}

#[tokio::test]
async fn test_malformed_rows_are_reported_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let content = "\
Region,Segment Type,Segment Name,Year,Value (USD Thousand)
Global,Type,Mesotherapy,2024,823932.7502
Global,Type,Mesotherapy,20x4,1000
Global,Type,Mesotherapy,2032,n/a
,Type,Micro-needle,2024,534317.2498
";
    let source = write_csv(&temp_dir, "malformed.csv", content);
    let output_path = temp_dir.path().display().to_string();

    let result = engine(
        toml_config(&source, &output_path, false),
        EditorialCatalog::default(),
    )
    .analyze()
    .await
    .unwrap();

    assert_eq!(result.record_count, 2);
    let warnings = &result.parse_warnings;
    assert_eq!(warnings.len(), 3);
    assert_eq!(warnings[0].line, 3);
    assert_eq!(warnings[0].action, RowAction::Dropped);
    assert_eq!(warnings[1].line, 4);
    assert_eq!(warnings[1].action, RowAction::Defaulted);
    assert_eq!(warnings[2].line, 5);
    assert_eq!(warnings[2].action, RowAction::Dropped);

    assert!((result.totals.market_size_base - 823.93).abs() < 0.01);
    assert_eq!(result.totals.market_size_forecast, 0.0);
    assert_eq!(result.totals.cagr, 0.0);
}

#[tokio::test]
async fn test_missing_global_region_yields_zero_totals() {
    let temp_dir = TempDir::new().unwrap();
    let content = "\
Region,Segment Type,Segment Name,Year,Value (USD Million)
Europe,Type,Mesotherapy,2024,296.6
Europe,Type,Mesotherapy,2032,665.1
";
    let source = write_csv(&temp_dir, "regional.csv", content);
    let output_path = temp_dir.path().display().to_string();

    let result = engine(
        toml_config(&source, &output_path, false),
        EditorialCatalog::default(),
    )
    .analyze()
    .await
    .unwrap();

    assert_eq!(result.totals.market_size_base, 0.0);
    assert_eq!(result.model.regions.len(), 1);
    assert_eq!(result.model.regions[0].metrics.market_share, 0.0);
    assert!(result.model.regions[0].metrics.cagr > 0.0);
    assert!(result.model.product_types.is_empty());
    assert!(result
        .validation_warnings
        .iter()
        .any(|w| w.kind == ValidationKind::MissingOverview));
}

#[tokio::test]
async fn test_compressed_output_archive() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().display().to_string();

    let run = engine(
        toml_config(&sample_csv(), &output_path, true),
        EditorialCatalog::default(),
    )
    .run()
    .await
    .unwrap();

    assert!(run.output_path.ends_with("market_etl_output.zip"));
    let zip_data = std::fs::read(temp_dir.path().join("market_etl_output.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["market_data.csv", "market_model.json", "warnings.json"]);

    let mut json = String::new();
    archive
        .by_name("market_model.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["metadata"]["recordCount"], 52);
}

#[tokio::test]
async fn test_missing_file_is_source_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.csv").display().to_string();
    let output_path = temp_dir.path().display().to_string();

    let err = engine(
        toml_config(&missing, &output_path, false),
        EditorialCatalog::default(),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, EtlError::Source(SourceError::NotFound { .. })));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_columns_is_source_error() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_csv(&temp_dir, "bad.csv", "Region,Year,Value\nGlobal,2024,1\n");
    let output_path = temp_dir.path().display().to_string();

    let err = engine(
        toml_config(&source, &output_path, false),
        EditorialCatalog::default(),
    )
    .analyze()
    .await
    .unwrap_err();

    match err {
        EtlError::Source(SourceError::MissingColumns { missing }) => {
            assert_eq!(missing, vec!["Segment Type", "Segment Name"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_dashboard_keeps_last_good_model() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_csv(&temp_dir, "good.csv", SCENARIO);
    let empty = write_csv(&temp_dir, "empty.csv", "");
    let output_path = temp_dir.path().display().to_string();
    let mut state = DashboardState::new();

    let started = chrono::Utc::now();
    let outcome = engine(toml_config(&good, &output_path, false), EditorialCatalog::default())
        .analyze()
        .await;
    assert_eq!(state.apply(outcome, started).unwrap(), ApplyOutcome::Replaced);

    let started = chrono::Utc::now();
    let outcome = engine(toml_config(&empty, &output_path, false), EditorialCatalog::default())
        .analyze()
        .await;
    let err = state.apply(outcome, started).unwrap_err();
    assert!(matches!(err, EtlError::Source(SourceError::Empty { .. })));

    let model = state.model().unwrap();
    assert_eq!(model.product_types.len(), 2);
}

#[tokio::test]
async fn test_idempotent_analysis() {
    let output_path = TempDir::new().unwrap().path().display().to_string();
    let config = || toml_config(&sample_csv(), &output_path, false);

    let first = engine(config(), EditorialCatalog::default())
        .analyze()
        .await
        .unwrap();
    let second = engine(config(), EditorialCatalog::default())
        .analyze()
        .await
        .unwrap();

    assert_eq!(first.model, second.model);
}
