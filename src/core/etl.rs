use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use crate::utils::progress::ProgressLog;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    progress: ProgressLog,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        let progress = ProgressLog::new(pipeline.progress_log_path());
        Self {
            pipeline,
            progress,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn progress_log(&self) -> &ProgressLog {
        &self.progress
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.progress
            .log("Preliminaries complete. Initiating ETL process")?;

        // Extract
        tracing::info!("🌐 Extracting GDP table...");
        let raw_rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", raw_rows.len());
        self.monitor.log_stats("Extract");
        self.progress
            .log("Data extraction complete. Initiating Transformation process")?;

        // Transform
        let extracted = raw_rows.len();
        let records = self.pipeline.transform(raw_rows).await?;
        tracing::info!("Transformed {} rows to USD billions", records.len());
        self.monitor.log_stats("Transform");
        self.progress
            .log("Data transformation complete. Initiating loading process")?;

        // Load
        let csv_path = self.pipeline.load_csv(&records).await?;
        tracing::info!("CSV written to {}", csv_path);
        self.progress.log("Data saved to CSV file")?;

        let db = self.pipeline.connect().await?;
        self.progress.log("SQL Connection initiated.")?;

        let loaded = match self.pipeline.load_db(&db, &records).await {
            Ok(n) => n as usize,
            Err(e) => {
                db.close().await;
                return Err(e);
            }
        };
        tracing::info!(
            "Loaded {} rows into {}:{}",
            loaded,
            db.location(),
            self.pipeline.table_name()
        );
        self.monitor.log_stats("Load");
        self.progress
            .log("Data loaded to Database as table. Running the query")?;

        // Query
        let query = self.pipeline.query(&db).await;
        let db_path = db.location().to_string();
        db.close().await;
        let query = query?;
        tracing::info!("Query returned {} rows", query.len());

        self.progress.log("Process Complete.")?;
        self.monitor.log_final_stats();

        Ok(RunSummary {
            extracted,
            loaded,
            csv_path,
            db_path,
            table_name: self.pipeline.table_name().to_string(),
            query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::GdpDatabase;
    use crate::core::{CountryGdp, QueryOutput, RawCountryRow};
    use crate::utils::error::EtlError;
    use tempfile::TempDir;

    struct StubPipeline {
        rows: Vec<RawCountryRow>,
        fail_extract: bool,
        log_path: String,
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<RawCountryRow>> {
            if self.fail_extract {
                return Err(EtlError::HttpStatusError {
                    url: "http://stub".to_string(),
                    status: 500,
                });
            }
            Ok(self.rows.clone())
        }

        async fn transform(&self, rows: Vec<RawCountryRow>) -> Result<Vec<CountryGdp>> {
            crate::core::transform::transform_rows(rows)
        }

        async fn load_csv(&self, _records: &[CountryGdp]) -> Result<String> {
            Ok("stub.csv".to_string())
        }

        async fn connect(&self) -> Result<GdpDatabase> {
            GdpDatabase::in_memory().await
        }

        async fn load_db(&self, db: &GdpDatabase, records: &[CountryGdp]) -> Result<u64> {
            db.load_table("Countries_by_GDP", records).await
        }

        async fn query(&self, db: &GdpDatabase) -> Result<QueryOutput> {
            db.run_query("SELECT * FROM Countries_by_GDP WHERE GDP_USD_billions >= 100")
                .await
        }

        fn progress_log_path(&self) -> String {
            self.log_path.clone()
        }

        fn table_name(&self) -> &str {
            "Countries_by_GDP"
        }
    }

    fn row(country: &str, gdp: &str) -> RawCountryRow {
        RawCountryRow {
            country: country.to_string(),
            gdp_usd_millions: gdp.to_string(),
        }
    }

    fn messages(log: &str) -> Vec<String> {
        log.lines()
            .map(|l| l.split_once(" : ").map(|(_, m)| m.to_string()).unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_run_logs_every_phase_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("etl_project_log.txt");

        let engine = EtlEngine::new(StubPipeline {
            rows: vec![row("Japan", "4,230,862"), row("Nauru", "151")],
            fail_extract: false,
            log_path: log_path.display().to_string(),
        });

        let summary = engine.run().await.unwrap();
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.query.len(), 1);
        assert_eq!(summary.db_path, ":memory:");

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(
            messages(&log),
            vec![
                "Preliminaries complete. Initiating ETL process",
                "Data extraction complete. Initiating Transformation process",
                "Data transformation complete. Initiating loading process",
                "Data saved to CSV file",
                "SQL Connection initiated.",
                "Data loaded to Database as table. Running the query",
                "Process Complete.",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_after_failed_extract() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("etl_project_log.txt");

        let engine = EtlEngine::new(StubPipeline {
            rows: vec![],
            fail_extract: true,
            log_path: log_path.display().to_string(),
        });

        assert!(engine.run().await.is_err());

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(
            messages(&log),
            vec!["Preliminaries complete. Initiating ETL process"]
        );
    }
}
