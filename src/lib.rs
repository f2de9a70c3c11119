pub mod app;
pub mod application;
pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod infrastructure;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::DigitalDataEtl;
pub use config::{cli::LocalStorage, etl_config::EtlRunConfig, settings::Settings};
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
