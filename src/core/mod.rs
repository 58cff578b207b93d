pub mod aggregator;
pub mod consistency;
pub mod etl;
pub mod export;
pub mod grouper;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod snapshot;
pub mod source;
pub mod transformer;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
