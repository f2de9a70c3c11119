pub mod cli;
pub mod etl_config;
pub mod settings;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "llm-twin")]
#[command(about = "Collects a person's online writing into the LLM twin document store")]
pub struct CliConfig {
    /// Settings secret file; environment variables and .env are used when it is missing
    #[arg(long, global = true, default_value = settings::DEFAULT_SECRET_FILE)]
    pub settings: PathBuf,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Crawl every link of a run config into the document store
    RunEtl {
        /// Path to the TOML run configuration
        #[arg(short, long, default_value = "configs/digital_data_etl.toml")]
        config: PathBuf,

        /// Where run reports are written
        #[arg(long, default_value = "./output")]
        report_dir: String,

        /// Log CPU and memory usage per phase
        #[arg(long)]
        monitor: bool,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Export the crawled collections to a ZIP archive
    ExportData {
        #[arg(short, long, default_value = "./output")]
        output: String,

        #[arg(long, default_value = "data_warehouse.zip")]
        filename: String,
    },

    /// Write the current settings to the settings secret file
    ExportSettings {
        /// Destination; defaults to the --settings path
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Check that the document store is reachable
    CheckDb,

    /// Print a greeting and the resolved settings
    Hello,
}
