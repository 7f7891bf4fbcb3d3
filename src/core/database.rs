use crate::domain::model::{CountryGdp, QueryOutput};
use crate::utils::error::Result;
use crate::utils::validation::validate_sql_identifier;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use std::path::Path;

/// SQLite database the transformed GDP table is loaded into.
#[derive(Debug, Clone)]
pub struct GdpDatabase {
    pool: SqlitePool,
    location: String,
}

impl GdpDatabase {
    /// Opens the database file, creating it when missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Delete)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened SQLite database at {}", path.display());
        Ok(Self {
            pool,
            location: path.display().to_string(),
        })
    }

    /// Opens an existing database without creating it.
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Delete)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            location: path.display().to_string(),
        })
    }

    pub async fn in_memory() -> Result<Self> {
        // a single connection that never expires keeps the in-memory database alive
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            location: ":memory:".to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Replaces `table` with `records`: drop, recreate, insert in one transaction.
    pub async fn load_table(&self, table: &str, records: &[CountryGdp]) -> Result<u64> {
        validate_sql_identifier("load.table_name", table)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE \"{}\" (\"Country\" TEXT, \"GDP_USD_billions\" REAL)",
            table
        ))
        .execute(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO \"{}\" (\"Country\", \"GDP_USD_billions\") VALUES (?, ?)",
            table
        );
        let mut inserted = 0;
        for record in records {
            let result = sqlx::query(&insert)
                .bind(&record.country)
                .bind(record.gdp_usd_billions)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!("Loaded {} rows into table {}", inserted, table);
        Ok(inserted)
    }

    /// Runs any statement and decodes every cell by its storage class.
    pub async fn run_query(&self, sql: &str) -> Result<QueryOutput> {
        tracing::debug!("Running query: {}", sql);

        let statement = (&self.pool).prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = statement.query().fetch_all(&self.pool).await?;
        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryOutput { columns, rows })
    }

    pub async fn countries_with_min_gdp(
        &self,
        table: &str,
        min_gdp_billions: f64,
    ) -> Result<Vec<CountryGdp>> {
        validate_sql_identifier("load.table_name", table)?;

        let rows = sqlx::query(&format!(
            "SELECT \"Country\", \"GDP_USD_billions\" FROM \"{}\" WHERE \"GDP_USD_billions\" >= ?",
            table
        ))
        .bind(min_gdp_billions)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CountryGdp {
                    country: row.try_get("Country")?,
                    gdp_usd_billions: row.try_get("GDP_USD_billions")?,
                })
            })
            .collect()
    }

    pub async fn row_count(&self, table: &str) -> Result<i64> {
        validate_sql_identifier("load.table_name", table)?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<serde_json::Value>> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

fn decode_cell(row: &SqliteRow, idx: usize) -> Result<serde_json::Value> {
    let storage_class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(serde_json::Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" => serde_json::Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => serde_json::Number::from_f64(row.try_get::<f64, _>(idx)?)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(idx)?;
            serde_json::Value::String(format!("<{} bytes>", bytes.len()))
        }
        _ => serde_json::Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}
