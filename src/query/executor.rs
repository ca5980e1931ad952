use std::time::{Duration, Instant};

use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};
use tracing::{debug, error, instrument, warn};

use super::statement::{Param, Statement};
use crate::metrics;
use crate::storage::{Column, Record, Scalar};

/// Error type for execution operations
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Query execution failed: {0}")]
    QueryExecution(String),
    #[error("Query did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

impl ExecutionError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::StorageUnavailable(_) => "storage_unavailable",
            ExecutionError::QueryExecution(_) => "query_execution",
            ExecutionError::DeadlineExceeded(_) => "deadline_exceeded",
        }
    }
}

impl From<sqlx::Error> for ExecutionError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => ExecutionError::StorageUnavailable(err.to_string()),
            other => ExecutionError::QueryExecution(other.to_string()),
        }
    }
}

/// Result type for execution operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Configuration for query execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Deadline for a single statement, including waiting for a connection
    pub timeout: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Runs statements against the pooled store
#[derive(Clone)]
pub struct QueryExecutor {
    pool: SqlitePool,
    config: ExecutionConfig,
}

impl QueryExecutor {
    /// Creates a new query executor
    pub fn new(pool: SqlitePool, config: ExecutionConfig) -> Self {
        Self { pool, config }
    }

    /// Executes a statement and materializes every row.
    ///
    /// The statement either completes or fails as a whole. When the deadline
    /// passes, the in-flight query is dropped and its connection released.
    #[instrument(skip_all, fields(columns = statement.columns.len()))]
    pub async fn execute(&self, statement: &Statement) -> ExecutionResult<Vec<Record>> {
        let started = Instant::now();
        let result = tokio::select! {
            result = self.execute_internal(statement) => result,
            _ = tokio::time::sleep(self.config.timeout) => {
                Err(ExecutionError::DeadlineExceeded(self.config.timeout))
            }
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(records) => {
                debug!(rows = records.len(), elapsed_ms, "Query finished");
                metrics::record_query(elapsed_ms, records.len());
            }
            Err(err @ ExecutionError::QueryExecution(_)) => {
                error!(sql = %statement.sql, "Statement rejected by the store: {}", err);
                metrics::record_query_error(err.kind());
            }
            Err(err) => {
                warn!("Query failed: {}", err);
                metrics::record_query_error(err.kind());
            }
        }
        result
    }

    async fn execute_internal(&self, statement: &Statement) -> ExecutionResult<Vec<Record>> {
        debug!(sql = %statement.sql, params = ?statement.params, "Executing statement");

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = match param {
                Param::Date(date) => query.bind(*date),
                Param::Text(text) => query.bind(text.as_str()),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| decode_row(row, &statement.columns))
            .collect()
    }

    /// Checks that a connection can be acquired and used
    pub async fn ping(&self) -> ExecutionResult<()> {
        let check = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(self.config.timeout, check).await {
            Ok(result) => result.map(|_| ()).map_err(ExecutionError::from),
            Err(_) => Err(ExecutionError::DeadlineExceeded(self.config.timeout)),
        }
    }

    /// Closes the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &SqliteRow, columns: &[String]) -> ExecutionResult<Record> {
    let mut record = Record::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        let value = decode_cell(row, index, name).map_err(|err| {
            ExecutionError::QueryExecution(format!("Failed to decode column '{}': {}", name, err))
        })?;
        record.push(name.as_str(), value);
    }
    Ok(record)
}

/// Decodes by the storage class of the value; `date` cells hold ISO dates as text
fn decode_cell(row: &SqliteRow, index: usize, name: &str) -> Result<Scalar, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Scalar::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" => Scalar::Integer(row.try_get::<i64, _>(index)?),
        "REAL" => Scalar::Float(row.try_get::<f64, _>(index)?),
        "TEXT" if name == Column::Date.name() => Scalar::Date(row.try_get::<NaiveDate, _>(index)?),
        "TEXT" => Scalar::Text(row.try_get::<String, _>(index)?),
        other => {
            return Err(sqlx::Error::ColumnDecode {
                index: name.to_string(),
                source: format!("unsupported storage class {}", other).into(),
            })
        }
    };
    Ok(value)
}
