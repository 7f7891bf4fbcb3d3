pub mod cli;
pub mod toml_config;

pub use toml_config::JobConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Args;

/// Job options shared by every subcommand. Values given here win over the
/// config file, which wins over the built-in defaults.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct CliConfig {
    /// Path to a TOML job configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Page to scrape the GDP table from
    #[arg(long)]
    pub url: Option<String>,

    /// Zero-based index of the <tbody> holding the GDP table
    #[arg(long)]
    pub table_index: Option<usize>,

    /// Directory the CSV, database and progress log are written to
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub csv_file: Option<String>,

    #[arg(long)]
    pub db_file: Option<String>,

    #[arg(long)]
    pub table_name: Option<String>,

    #[arg(long)]
    pub progress_log: Option<String>,

    /// Threshold for the default query, in billions of USD
    #[arg(long)]
    pub min_gdp: Option<f64>,

    /// Run this SQL statement instead of the threshold query
    #[arg(long)]
    pub sql: Option<String>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn resolve(&self) -> Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                JobConfig::from_file(path)?
            }
            None => JobConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut JobConfig) {
        if let Some(url) = &self.url {
            config.source.url = url.clone();
        }
        if let Some(index) = self.table_index {
            config.source.table_index = index;
        }
        if let Some(path) = &self.output_path {
            config.load.output_path = path.clone();
        }
        if let Some(file) = &self.csv_file {
            config.load.csv_file = file.clone();
        }
        if let Some(file) = &self.db_file {
            config.load.db_file = file.clone();
        }
        if let Some(table) = &self.table_name {
            config.load.table_name = table.clone();
        }
        if let Some(log) = &self.progress_log {
            config.logging.progress_log = log.clone();
        }
        if let Some(min_gdp) = self.min_gdp {
            config.query.min_gdp_billions = min_gdp;
        }
        if let Some(sql) = &self.sql {
            config.query.sql = Some(sql.clone());
        }
    }
}
