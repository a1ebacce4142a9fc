//! Evaluate command: run the model plan over a cleaned table in memory

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::PipelineConfig;
use crate::model::{self, MajorityModel, MemorySource};
use crate::storage;

pub async fn execute(input: &Path, config: &PipelineConfig) -> Result<()> {
    let table = storage::load_table(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let source = MemorySource::new(table);
    let mut model = MajorityModel::new(config.model.target.clone());
    let report = model::run_model(&source, &mut model, &config.model).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
