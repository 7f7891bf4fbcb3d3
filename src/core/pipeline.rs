use crate::core::database::GdpDatabase;
use crate::core::{html_table, transform};
use crate::core::{ConfigProvider, CountryGdp, Pipeline, QueryOutput, RawCountryRow, Storage};
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;

pub struct GdpPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> GdpPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            storage,
            config,
            client,
        })
    }

    pub fn db_path(&self) -> String {
        Path::new(self.config.output_path())
            .join(self.config.db_file())
            .display()
            .to_string()
    }

    async fn fetch_once(&self) -> Result<String> {
        let url = self.config.source_url();
        tracing::debug!("Requesting {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status != StatusCode::OK {
            return Err(EtlError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Downloads the source page, retrying transport failures and 5xx responses.
    pub async fn fetch_page(&self) -> Result<String> {
        let attempts = self.config.retry_attempts() + 1;
        let delay = Duration::from_secs(self.config.retry_delay_seconds());

        let mut attempt = 1;
        loop {
            match self.fetch_once().await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        "⚠️ Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for GdpPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawCountryRow>> {
        let page = self.fetch_page().await?;
        tracing::debug!("Downloaded {} bytes", page.len());

        let rows = html_table::parse_gdp_rows(&page, self.config.table_index())?;
        if rows.is_empty() {
            tracing::warn!(
                "Table #{} of {} contained no country rows; check source.table_index",
                self.config.table_index(),
                html_table::count_tables(&page)?
            );
        }
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<RawCountryRow>) -> Result<Vec<CountryGdp>> {
        transform::transform_rows(rows)
    }

    async fn load_csv(&self, records: &[CountryGdp]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if records.is_empty() {
            writer.write_record(["Country", "GDP_USD_billions"])?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        let data = writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))?;

        tracing::debug!("Writing CSV ({} bytes)", data.len());
        self.storage.write_file(self.config.csv_file(), &data).await?;
        Ok(self.storage.display_path(self.config.csv_file()))
    }

    async fn connect(&self) -> Result<GdpDatabase> {
        GdpDatabase::open(self.db_path()).await
    }

    async fn load_db(&self, db: &GdpDatabase, records: &[CountryGdp]) -> Result<u64> {
        db.load_table(self.config.table_name(), records).await
    }

    async fn query(&self, db: &GdpDatabase) -> Result<QueryOutput> {
        db.run_query(&self.config.query_statement()).await
    }

    fn progress_log_path(&self) -> String {
        self.storage.display_path(self.config.progress_log())
    }

    fn table_name(&self) -> &str {
        self.config.table_name()
    }
}
