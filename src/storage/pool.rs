use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// How long a request waits for a free connection before the store counts as unavailable
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a read-only connection pool to the database at `db_url`.
///
/// The pool is acquired once at startup and closed at shutdown; the
/// `dataset` table must already exist.
pub async fn connect(db_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?.read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;
    info!("Connected to {} with up to {} connections", db_url, max_connections);
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// One row of the `dataset` table
    #[derive(Debug, Clone)]
    pub struct DatasetRow {
        pub date: &'static str,
        pub channel: &'static str,
        pub country: &'static str,
        pub os: &'static str,
        pub impressions: i64,
        pub clicks: i64,
        pub installs: i64,
        pub spend: f64,
        pub revenue: f64,
    }

    pub fn row(date: &'static str, channel: &'static str, installs: i64, spend: f64) -> DatasetRow {
        DatasetRow {
            date,
            channel,
            country: "US",
            os: "ios",
            impressions: 100,
            clicks: 10,
            installs,
            spend,
            revenue: 0.0,
        }
    }

    pub const CREATE_TABLE: &str = "CREATE TABLE dataset (
        date DATE,
        channel TEXT,
        country TEXT,
        os TEXT,
        impressions INTEGER,
        clicks INTEGER,
        installs INTEGER,
        spend FLOAT,
        revenue FLOAT
    )";

    pub async fn insert_rows(pool: &SqlitePool, rows: &[DatasetRow]) {
        for row in rows {
            sqlx::query("INSERT INTO dataset VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
                .bind(row.date)
                .bind(row.channel)
                .bind(row.country)
                .bind(row.os)
                .bind(row.impressions)
                .bind(row.clicks)
                .bind(row.installs)
                .bind(row.spend)
                .bind(row.revenue)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    /// An in-memory database holding `rows`. One connection keeps the data alive.
    pub async fn memory_pool(rows: &[DatasetRow]) -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(CREATE_TABLE).execute(&pool).await.unwrap();
        insert_rows(&pool, rows).await;
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{insert_rows, row, CREATE_TABLE};
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_connect_opens_existing_database_read_only() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let writer = SqlitePoolOptions::new().connect(&url).await.unwrap();
        sqlx::query(CREATE_TABLE).execute(&writer).await.unwrap();
        insert_rows(&writer, &[row("2023-01-01", "A", 10, 5.0)]).await;
        writer.close().await;

        let pool = connect(&format!("sqlite://{}", path.display()), 2).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dataset")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let write = sqlx::query("DELETE FROM dataset").execute(&pool).await;
        assert!(write.is_err());
        pool.close().await;
    }

    #[tokio::test]
    async fn test_connect_missing_database_fails() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing.db");
        assert!(connect(&format!("sqlite://{}", path.display()), 1).await.is_err());
    }
}
