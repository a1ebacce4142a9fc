//! Load command: push a cleaned table into the database

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::PipelineConfig;
use crate::storage;

pub async fn execute(input: &Path, table: Option<String>, config: &PipelineConfig) -> Result<()> {
    let loans = storage::load_table(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let name = table.unwrap_or_else(|| config.database.table.clone());
    let inserted = insert(&loans, &name, config).await?;

    println!("Loaded {} of {} loans into {}", inserted, loans.len(), name);
    Ok(())
}

#[cfg(feature = "postgres")]
async fn insert(loans: &crate::table::LoanTable, name: &str, config: &PipelineConfig) -> Result<u64> {
    let store = crate::sql::PostgresStore::connect(&config.database).await?;
    let inserted = store.load_table(name, loans).await?;
    store.close().await;
    Ok(inserted)
}

#[cfg(not(feature = "postgres"))]
async fn insert(
    _loans: &crate::table::LoanTable,
    _name: &str,
    _config: &PipelineConfig,
) -> Result<u64> {
    Err(anyhow::anyhow!(
        "kiva was built without PostgreSQL support; rebuild with --features postgres"
    ))
}
