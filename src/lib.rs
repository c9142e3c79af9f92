pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{http::SocrataClient, storage::LocalStorage};
pub use crate::config::Settings;
pub use crate::core::{etl::EtlEngine, pipeline::ServiceRequestPipeline};
pub use crate::domain::model::{Origin, Record, ServiceRequestTable, TimeWindow};
pub use crate::utils::error::{EtlError, Result};
