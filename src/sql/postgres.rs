//! PostgreSQL loan store

use super::{create_table_sql, validate_table_name, LoanQuery};
use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};
use crate::model::{FeatureFrame, FeatureSource};
use crate::table::LoanTable;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::time::Duration;
use tracing::{debug, info};

/// Rows sent per `INSERT`
const INSERT_CHUNK: usize = 1_000;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            config.host, config.port, config.name
        );

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.name)
            .log_statements(log::LevelFilter::Debug)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(1));
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| PipelineError::database(format!("Failed to connect to database: {e}")))?;

        Ok(Self { pool })
    }

    /// Create `name` with one column per table column
    pub async fn create_table(&self, name: &str, table: &LoanTable) -> Result<()> {
        let sql = create_table_sql(name, table)?;
        debug!("{}", sql);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::database(format!("Failed to create {name}: {e}")))?;
        Ok(())
    }

    /// Insert every row; rows whose id already exists are skipped. Returns
    /// the number of rows inserted.
    pub async fn insert_table(&self, name: &str, table: &LoanTable) -> Result<u64> {
        validate_table_name(name)?;
        let sql = format!(
            "INSERT INTO {name} SELECT * FROM jsonb_populate_recordset(NULL::{name}, $1::jsonb) \
             ON CONFLICT (id) DO NOTHING"
        );

        let mut inserted = 0;
        for chunk in table.rows().chunks(INSERT_CHUNK) {
            let payload: Vec<Value> = chunk.iter().map(|r| Value::Object(r.to_object())).collect();
            let result = sqlx::query(&sql)
                .bind(serde_json::to_string(&payload)?)
                .execute(&self.pool)
                .await
                .map_err(|e| PipelineError::database(format!("Failed to insert into {name}: {e}")))?;
            inserted += result.rows_affected();
        }

        info!("Inserted {} of {} rows into {}", inserted, table.len(), name);
        Ok(inserted)
    }

    /// Create the table if needed and load every row into it
    pub async fn load_table(&self, name: &str, table: &LoanTable) -> Result<u64> {
        self.create_table(name, table).await?;
        self.insert_table(name, table).await
    }

    pub async fn fetch(&self, query: &LoanQuery) -> Result<Vec<Map<String, Value>>> {
        let sql = format!("SELECT row_to_json(q)::text FROM ({}) q", query.to_sql()?);
        debug!("{}", sql);

        let rows: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PipelineError::database(format!("Query failed: {e}")))?;

        rows.iter()
            .map(|text| match serde_json::from_str(text)? {
                Value::Object(map) => Ok(map),
                other => Err(PipelineError::database(format!(
                    "expected a row object, got {other}"
                ))),
            })
            .collect()
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FeatureSource for PostgresStore {
    async fn load(&self, query: &LoanQuery) -> Result<FeatureFrame> {
        let rows = self.fetch(query).await?;
        Ok(FeatureFrame::new(query.columns.clone(), rows))
    }
}
