use crate::domain::model::{SequencedRow, SqlValue};
use crate::domain::ports::ReportSink;
use crate::domain::schema::{TableSchema, SURROGATE_KEY};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row as _};
use std::path::Path;
use std::str::FromStr;

/// 整個行程共用的單一 SQLite 連線
pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtlError::ConnectionError {
                message: format!("{}: {}", parent.display(), e),
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::open(options).await
    }

    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(connection_error)?;
        Self::open(options).await
    }

    async fn open(options: SqliteConnectOptions) -> Result<Self> {
        let conn = options.connect().await.map_err(connection_error)?;
        Ok(Self { conn })
    }

    pub async fn row_count(&mut self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    pub fn connection_mut(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

fn connection_error(e: sqlx::Error) -> EtlError {
    EtlError::ConnectionError {
        message: e.to_string(),
    }
}

#[async_trait]
impl ReportSink for SqliteStore {
    async fn reset_table(&mut self, schema: &TableSchema) -> Result<()> {
        let schema_error = |e: sqlx::Error| EtlError::SchemaError {
            table: schema.name.clone(),
            message: e.to_string(),
        };

        sqlx::query(&schema.drop_sql())
            .execute(&mut self.conn)
            .await
            .map_err(schema_error)?;
        sqlx::query(&schema.create_sql())
            .execute(&mut self.conn)
            .await
            .map_err(schema_error)?;

        tracing::debug!("🗄️ Table {} recreated", schema.name);
        Ok(())
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(&mut self.conn)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(EtlError::from))
            .collect()
    }

    async fn insert_batch(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[SequencedRow],
    ) -> Result<usize> {
        let placeholders = vec!["?"; columns.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ({})",
            table,
            SURROGATE_KEY,
            columns.join(", "),
            placeholders
        );

        let mut tx = self.conn.begin().await?;
        for sequenced in rows {
            let mut query = sqlx::query(&sql).bind(sequenced.seq);
            for value in &sequenced.row.values {
                query = match value {
                    SqlValue::Integer(i) => query.bind(*i),
                    SqlValue::Text(s) => query.bind(s.as_str()),
                };
            }

            query
                .execute(&mut *tx)
                .await
                .map_err(|e| EtlError::InsertError {
                    table: table.to_string(),
                    row: sequenced.seq,
                    message: e.to_string(),
                })?;
        }
        tx.commit().await?;

        Ok(rows.len())
    }
}
