pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, OutputFormat};

pub use core::etl::{EtlEngine, EtlRun};
pub use core::pipeline::MarketPipeline;
pub use core::snapshot::{ApplyOutcome, DashboardState};
pub use core::source::Source;
pub use domain::editorial::EditorialCatalog;
pub use domain::model::{DomainModel, TransformResult};
pub use utils::error::{EtlError, Result, SourceError};
