//! Batch command: one cleaned dump per raw directory

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::build::resolve_options;
use crate::cli::args::BuildArgs;
use crate::config::PipelineConfig;
use crate::storage;

pub fn execute(
    folders: &[PathBuf],
    out_dir: &Path,
    args: &BuildArgs,
    config: &PipelineConfig,
) -> Result<()> {
    let options = resolve_options(args, config)?;
    let written = storage::transform_folders(folders, out_dir, &options)
        .context("Failed to transform batch folders")?;

    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}
