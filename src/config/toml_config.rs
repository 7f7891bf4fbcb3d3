use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str = "https://web.archive.org/web/20230902185326/https://en.wikipedia.org/wiki/List_of_countries_by_GDP_%28nominal%29";
pub const DEFAULT_TABLE_INDEX: usize = 2;
pub const DEFAULT_CSV_FILE: &str = "Countries_by_GDP.csv";
pub const DEFAULT_DB_FILE: &str = "World_Economies.db";
pub const DEFAULT_TABLE_NAME: &str = "Countries_by_GDP";
pub const DEFAULT_PROGRESS_LOG: &str = "etl_project_log.txt";
pub const DEFAULT_MIN_GDP_BILLIONS: f64 = 100.0;

/// Job settings, loadable from TOML. Every field has a default so a file only
/// needs the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub table_index: usize,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            table_index: DEFAULT_TABLE_INDEX,
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_seconds: 1,
            user_agent: concat!("gdp-etl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub csv_file: String,
    pub db_file: String,
    pub table_name: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            csv_file: DEFAULT_CSV_FILE.to_string(),
            db_file: DEFAULT_DB_FILE.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub min_gdp_billions: f64,
    pub sql: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_gdp_billions: DEFAULT_MIN_GDP_BILLIONS,
            sql: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub progress_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            progress_log: DEFAULT_PROGRESS_LOG.to_string(),
        }
    }
}

impl JobConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for JobConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn table_index(&self) -> usize {
        self.source.table_index
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.source.retry_delay_seconds
    }

    fn user_agent(&self) -> &str {
        &self.source.user_agent
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn csv_file(&self) -> &str {
        &self.load.csv_file
    }

    fn db_file(&self) -> &str {
        &self.load.db_file
    }

    fn table_name(&self) -> &str {
        &self.load.table_name
    }

    fn progress_log(&self) -> &str {
        &self.logging.progress_log
    }

    fn min_gdp_billions(&self) -> f64 {
        self.query.min_gdp_billions
    }

    fn custom_query(&self) -> Option<&str> {
        self.query.sql.as_deref()
    }
}

impl Validate for JobConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 300)?;
        validation::validate_range("source.retry_attempts", self.source.retry_attempts, 0, 10)?;
        validation::validate_non_empty_string("source.user_agent", &self.source.user_agent)?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_path("load.csv_file", &self.load.csv_file)?;
        validation::validate_path("load.db_file", &self.load.db_file)?;
        validation::validate_sql_identifier("load.table_name", &self.load.table_name)?;

        validation::validate_path("logging.progress_log", &self.logging.progress_log)?;

        validation::validate_finite("query.min_gdp_billions", self.query.min_gdp_billions)?;
        if let Some(sql) = &self.query.sql {
            validation::validate_non_empty_string("query.sql", sql)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_cover_every_setting() {
        let config = JobConfig::default();
        assert_eq!(config.source_url(), DEFAULT_SOURCE_URL);
        assert_eq!(config.table_index(), 2);
        assert_eq!(config.csv_file(), "Countries_by_GDP.csv");
        assert_eq!(config.db_file(), "World_Economies.db");
        assert_eq!(config.table_name(), "Countries_by_GDP");
        assert_eq!(config.progress_log(), "etl_project_log.txt");
        assert_eq!(
            config.query_statement(),
            "SELECT * FROM Countries_by_GDP WHERE GDP_USD_billions >= 100"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[source]
table_index = 3
timeout_seconds = 10

[load]
output_path = "./out"
table_name = "Gdp2023"

[query]
min_gdp_billions = 500.5
"#;

        let config = JobConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.table_index, 3);
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.load.output_path, "./out");
        assert_eq!(config.load.csv_file, DEFAULT_CSV_FILE);
        assert_eq!(
            config.query_statement(),
            "SELECT * FROM Gdp2023 WHERE GDP_USD_billions >= 500.5"
        );
    }

    #[test]
    fn test_custom_sql_overrides_threshold_query() {
        let toml_content = r#"
[query]
sql = "SELECT Country FROM Countries_by_GDP ORDER BY GDP_USD_billions DESC LIMIT 5"
"#;
        let config = JobConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.query_statement(),
            "SELECT Country FROM Countries_by_GDP ORDER BY GDP_USD_billions DESC LIMIT 5"
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GDP_ETL_TEST_OUTPUT_DIR", "/tmp/gdp-output");

        let toml_content = r#"
[load]
output_path = "${GDP_ETL_TEST_OUTPUT_DIR}"
db_file = "${GDP_ETL_TEST_UNSET_VAR}.db"
"#;

        let config = JobConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.load.output_path, "/tmp/gdp-output");
        assert_eq!(config.load.db_file, "${GDP_ETL_TEST_UNSET_VAR}.db");

        std::env::remove_var("GDP_ETL_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let config = JobConfig::from_toml_str("[source]\nurl = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config =
            JobConfig::from_toml_str("[load]\ntable_name = \"bad name\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = JobConfig::from_toml_str("[source]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = JobConfig::from_toml_str("[source\nurl = 1").unwrap_err();
        assert!(matches!(err, EtlError::TomlError(_)));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = JobConfig::from_toml_str(include_str!("../../gdp-etl.toml")).unwrap();
        assert_eq!(config, JobConfig::default());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nprogress_log = \"run.log\"\n")
            .unwrap();

        let config = JobConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.progress_log(), "run.log");
    }
}
