use crate::core::database::GdpDatabase;
use crate::domain::model::{CountryGdp, QueryOutput, RawCountryRow};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Returns `false` when there was nothing to remove.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Location of `path` as seen by users, for reporting.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn table_index(&self) -> usize;
    fn timeout_seconds(&self) -> u64;
    fn retry_attempts(&self) -> u32;
    fn retry_delay_seconds(&self) -> u64;
    fn user_agent(&self) -> &str;
    fn output_path(&self) -> &str;
    fn csv_file(&self) -> &str;
    fn db_file(&self) -> &str;
    fn table_name(&self) -> &str;
    fn progress_log(&self) -> &str;
    fn min_gdp_billions(&self) -> f64;
    fn custom_query(&self) -> Option<&str>;

    fn query_statement(&self) -> String {
        match self.custom_query() {
            Some(sql) => sql.to_string(),
            None => format!(
                "SELECT * FROM {} WHERE GDP_USD_billions >= {}",
                self.table_name(),
                self.min_gdp_billions()
            ),
        }
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawCountryRow>>;
    async fn transform(&self, rows: Vec<RawCountryRow>) -> Result<Vec<CountryGdp>>;
    async fn load_csv(&self, records: &[CountryGdp]) -> Result<String>;
    async fn connect(&self) -> Result<GdpDatabase>;
    async fn load_db(&self, db: &GdpDatabase, records: &[CountryGdp]) -> Result<u64>;
    async fn query(&self, db: &GdpDatabase) -> Result<QueryOutput>;
    fn progress_log_path(&self) -> String;
    fn table_name(&self) -> &str;
}
