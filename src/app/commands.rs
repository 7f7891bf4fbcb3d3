use crate::config::cli::LocalStorage;
use crate::config::JobConfig;
use crate::core::database::GdpDatabase;
use crate::core::etl::EtlEngine;
use crate::core::pipeline::GdpPipeline;
use crate::core::{ConfigProvider, Pipeline, QueryOutput, RawCountryRow, RunSummary, Storage};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use std::path::Path;

fn build_pipeline(config: JobConfig) -> Result<GdpPipeline<LocalStorage, JobConfig>> {
    config.validate()?;
    let storage = LocalStorage::new(config.load.output_path.clone());
    GdpPipeline::new(storage, config)
}

/// Full job: extract, transform, CSV, database, query.
pub async fn run_job(config: JobConfig, monitor_enabled: bool) -> Result<RunSummary> {
    let pipeline = build_pipeline(config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    tracing::info!(
        "Progress log: {}",
        engine.progress_log().path().display()
    );
    engine.run().await
}

/// Fetches and parses the source table without writing anything.
pub async fn extract_rows(config: JobConfig) -> Result<Vec<RawCountryRow>> {
    let pipeline = build_pipeline(config)?;
    pipeline.extract().await
}

/// Runs the configured query against a database produced by an earlier run.
pub async fn query_database(config: JobConfig) -> Result<QueryOutput> {
    config.validate()?;
    let db_path = Path::new(config.output_path()).join(config.db_file());
    if !db_path.exists() {
        return Err(EtlError::ValidationError {
            message: format!(
                "database {} does not exist; run the job first",
                db_path.display()
            ),
        });
    }

    let db = GdpDatabase::open_existing(&db_path).await?;
    let output = db.run_query(&config.query_statement()).await;
    db.close().await;
    output
}

/// Deletes the CSV, database and progress log. Returns the paths that existed.
pub async fn clean_outputs(config: JobConfig) -> Result<Vec<String>> {
    config.validate()?;
    let storage = LocalStorage::new(config.load.output_path.clone());
    let journal = format!("{}-journal", config.db_file());
    let targets = [
        config.csv_file(),
        config.db_file(),
        journal.as_str(),
        config.progress_log(),
    ];

    let mut removed = Vec::new();
    for target in targets {
        if storage.remove_file(target).await? {
            tracing::debug!("Removed {}", storage.display_path(target));
            removed.push(storage.display_path(target));
        }
    }
    Ok(removed)
}
