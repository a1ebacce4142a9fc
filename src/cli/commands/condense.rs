//! Condense command: merge cleaned dumps

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::storage;

pub fn execute(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let table = storage::condense(inputs, output)
        .with_context(|| format!("Failed to condense into {}", output.display()))?;

    println!(
        "Condensed {} files into {} loans -> {}",
        inputs.len(),
        table.len(),
        output.display()
    );
    Ok(())
}
