//! Persisting and reloading cleaned loan tables
//!
//! Tables are written as a JSON array of rows, as a gzip snapshot, or as a
//! CSV export. Batches built separately can be merged and condensed into a
//! single deduplicated table.

pub mod export;
pub mod snapshot;


use crate::error::{PipelineError, Result};
use crate::table::columns;
use crate::table::LoanTable;
use crate::transform::{self, BuildOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Snapshot,
    Csv,
}

impl Format {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "snap" | "gz" => Some(Self::Snapshot),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Snapshot => "snap",
            Self::Csv => "csv",
        }
    }
}

fn resolve_format(path: &Path, format: Option<Format>) -> Result<Format> {
    format.or_else(|| Format::from_path(path)).ok_or_else(|| {
        PipelineError::Config(format!(
            "cannot infer table format from {}; use .json, .snap or .csv",
            path.display()
        ))
    })
}

/// Write a table, creating parent directories as needed. The format is
/// inferred from the extension when not given.
pub fn save_table(table: &LoanTable, path: &Path, format: Option<Format>) -> Result<()> {
    let format = resolve_format(path, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io_at(parent, e))?;
    }

    match format {
        Format::Json => {
            let file = fs::File::create(path).map_err(|e| PipelineError::io_at(path, e))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, table)?;
            writer.flush()?;
        }
        Format::Snapshot => {
            let bytes = snapshot::encode(table)?;
            fs::write(path, bytes).map_err(|e| PipelineError::io_at(path, e))?;
        }
        Format::Csv => {
            let file = fs::File::create(path).map_err(|e| PipelineError::io_at(path, e))?;
            export::write_csv(table, BufWriter::new(file))?;
        }
    }

    info!("Saved {} rows to {} ({:?})", table.len(), path.display(), format);
    Ok(())
}

/// Read a table written by [`save_table`] as JSON or snapshot
pub fn load_table(path: &Path) -> Result<LoanTable> {
    let format = resolve_format(path, None)?;
    let bytes = fs::read(path).map_err(|e| PipelineError::io_at(path, e))?;

    let table = match format {
        Format::Json => serde_json::from_slice(&bytes)?,
        Format::Snapshot => snapshot::decode(&bytes)?,
        Format::Csv => {
            return Err(PipelineError::Config(format!(
                "{} is a CSV export and cannot be loaded as a table",
                path.display()
            )))
        }
    };

    debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Concatenate several saved batches in order
pub fn load_tables<P: AsRef<Path>>(paths: &[P]) -> Result<LoanTable> {
    let tables = paths
        .iter()
        .map(|p| load_table(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(LoanTable::concat(tables))
}

/// Load cleaned batches, drop the given columns and optionally reindex
/// (deduplicate by id)
pub fn load_cleaned<P: AsRef<Path>>(
    paths: &[P],
    drops: &[&str],
    reindex: bool,
) -> Result<LoanTable> {
    let mut table = load_tables(paths)?;
    if !drops.is_empty() {
        table.drop_columns(drops);
    }
    if reindex {
        let removed = table.dedup_by_id();
        debug!("Reindex removed {} duplicate rows", removed);
    }
    Ok(table)
}

/// Build every folder separately and dump each to `<out_dir>/<folder>.json`.
/// Returns the written paths.
pub fn transform_folders<P: AsRef<Path>>(
    folders: &[P],
    out_dir: &Path,
    options: &BuildOptions,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(folders.len());

    for folder in folders {
        let folder = folder.as_ref();
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PipelineError::Config(format!("folder {} has no name", folder.display()))
            })?;

        let table = transform::build_from_dir(folder, options)?;
        let path = out_dir.join(format!("{name}.{}", Format::Json.extension()));
        save_table(&table, &path, Some(Format::Json))?;
        written.push(path);
    }

    info!("Transformed {} folders into {}", written.len(), out_dir.display());
    Ok(written)
}

/// Merge cleaned batches into one deduplicated table without the listing
/// image, name and partner columns, and save it to `out`
pub fn condense<P: AsRef<Path>>(paths: &[P], out: &Path) -> Result<LoanTable> {
    let table = load_cleaned(paths, columns::CONDENSE_DROPS, true)?;
    save_table(&table, out, None)?;
    Ok(table)
}
