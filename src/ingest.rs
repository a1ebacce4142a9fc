//! Reading raw loan batches from disk

use crate::error::{PipelineError, Result};
use crate::record::{LoanBatch, RawLoan};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read every `*.json` file directly under `dir` and return the loans they
/// carry, deduplicated by id.
pub fn import_loans(dir: &Path) -> Result<Vec<RawLoan>> {
    let files = batch_files(dir)?;
    if files.is_empty() {
        warn!("No .json files found in {}", dir.display());
    }

    let mut loans = Vec::new();
    for file in &files {
        loans.extend(read_batch_file(file)?);
    }

    let total = loans.len();
    let loans = dedup_by_id(loans);
    info!(
        "Imported {} loans from {} files in {} ({} duplicates dropped)",
        loans.len(),
        files.len(),
        dir.display(),
        total - loans.len()
    );
    Ok(loans)
}

/// Sorted list of `*.json` files directly under `dir`
pub fn batch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::io_at(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let pattern = dir.join("*.json");
    let mut files = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one source file. Each non-empty line is a JSON object holding a
/// `loans` array.
pub fn read_batch_file(path: &Path) -> Result<Vec<RawLoan>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io_at(path, e))?;

    let mut loans = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let batch: LoanBatch =
            serde_json::from_str(line).map_err(|source| PipelineError::JsonAt {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
        loans.extend(batch.loans);
    }

    debug!("Read {} loans from {}", loans.len(), path.display());
    Ok(loans)
}

/// Keep the first record for each id, preserving input order
pub fn dedup_by_id(records: Vec<RawLoan>) -> Vec<RawLoan> {
    let mut seen = HashSet::with_capacity(records.len());
    records.into_iter().filter(|r| seen.insert(r.id)).collect()
}
