pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, JobConfig};

pub use crate::core::{database::GdpDatabase, etl::EtlEngine, pipeline::GdpPipeline};
pub use crate::domain::model::{CountryGdp, QueryOutput, RawCountryRow, RunSummary};
pub use crate::utils::error::{EtlError, Result};
