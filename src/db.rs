//! Read-only crew database / 只读船员数据库
//!
//! The data file is opened once at startup and shared by every widget.
//! All access goes through [`CrewSource`] so the shell can be driven by
//! canned sources in tests.
//!
//! SQLite's `LIKE` only folds ASCII, so names are matched with the `regexp`
//! function sqlx registers on each connection: the fragment is escaped into a
//! literal, Unicode case-insensitive pattern and bound as a parameter.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, TypeInfo, ValueRef};
use std::path::Path;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::DataSourceError;
use crate::models::{CrewRecord, FieldValue};

/// Case-insensitive substring match on `name`; the pattern is always bound
const SEARCH_CREW_SQL: &str = "SELECT * FROM crew WHERE name IS NOT NULL AND name REGEXP ?";

/// Query surface over the crew table / 船员查询接口
#[async_trait]
pub trait CrewSource: Send + Sync {
    /// Every row whose name contains `fragment` (case-insensitive), in table order.
    /// An empty fragment matches every row.
    async fn search_crew_by_name(&self, fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError>;
}

/// Literal, Unicode case-insensitive pattern for a name fragment / 构造匹配模式
pub fn name_pattern(fragment: &str) -> String {
    format!("(?i){}", regex::escape(fragment))
}

/// SQLite-backed crew store / SQLite船员数据源
pub struct CrewStore {
    db: Pool<Sqlite>,
    query_timeout: Duration,
}

impl CrewStore {
    /// Open the data file read-only. The file must already exist and be a
    /// SQLite database; the `crew` table itself is checked per search.
    pub async fn open(path: &Path, config: &DatabaseConfig) -> Result<Self, DataSourceError> {
        let open_error = |source| DataSourceError::Open {
            path: path.to_path_buf(),
            source,
        };

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .with_regexp();

        let db = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(open_error)?;

        // Connecting does not read the header; a non-database file fails here
        sqlx::query("SELECT COUNT(*) FROM sqlite_master")
            .fetch_one(&db)
            .await
            .map_err(open_error)?;

        tracing::info!("Crew database opened read-only: {:?}", path);

        Ok(Self {
            db,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    /// Count crew rows, logged once at startup.
    pub async fn count(&self) -> Result<i64, DataSourceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crew")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn fetch_matching(&self, fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError> {
        let rows = sqlx::query(SEARCH_CREW_SQL)
            .bind(name_pattern(fragment))
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DataSourceError::from)
    }
}

#[async_trait]
impl CrewSource for CrewStore {
    async fn search_crew_by_name(&self, fragment: &str) -> Result<Vec<CrewRecord>, DataSourceError> {
        // A zero timeout disables the limit
        let records = if self.query_timeout.is_zero() {
            self.fetch_matching(fragment).await?
        } else {
            tokio::time::timeout(self.query_timeout, self.fetch_matching(fragment))
                .await
                .map_err(|_| DataSourceError::Timeout(self.query_timeout))??
        };

        tracing::debug!(
            "Crew search: fragment_len={}, rows={}",
            fragment.chars().count(),
            records.len()
        );
        Ok(records)
    }
}

/// Convert a row into a record, keeping column order / 行转换为记录
fn decode_row(row: &SqliteRow) -> Result<CrewRecord, sqlx::Error> {
    let mut fields = Vec::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        fields.push((column.name().to_string(), decode_field(row, idx)?));
    }
    Ok(CrewRecord::new(fields))
}

/// Decode by the value's runtime storage class, not the declared column type
fn decode_field(row: &SqliteRow, idx: usize) -> Result<FieldValue, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(FieldValue::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let value = match type_name.as_str() {
        "INTEGER" | "BIGINT" | "INT" | "INT8" | "BOOLEAN" => {
            FieldValue::Integer(row.try_get_unchecked::<i64, _>(idx)?)
        }
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            FieldValue::Real(row.try_get_unchecked::<f64, _>(idx)?)
        }
        "BLOB" => FieldValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        // SQLite does not enforce UTF-8 in TEXT values
        _ => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
            FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    };
    Ok(value)
}
